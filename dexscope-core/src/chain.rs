//! Chain identifiers as used in routes, API calls and block explorer links.

pub const SOLANA: &str = "solana";

/// Route segment to API chain id.
pub const PATH_TO_CHAIN_ID: &[(&str, &str)] = &[
    ("ethereum", "0x1"),
    ("eth", "0x1"),
    ("binance", "0x38"),
    ("bsc", "0x38"),
    ("polygon", "0x89"),
    ("solana", SOLANA),
    ("arbitrum", "0xa4b1"),
    ("base", "0x2105"),
    ("avalanche", "0xa86a"),
    ("optimism", "0xa"),
    ("linea", "0xe708"),
    ("fantom", "0xfa"),
    ("pulse", "0x171"),
    ("ronin", "0x7e4"),
];

/// Chains listed in the sidebar: (route segment, display name).
pub const SIDEBAR_CHAINS: &[(&str, &str)] = &[
    ("solana", "Solana"),
    ("ethereum", "Ethereum"),
    ("bsc", "BSC"),
    ("base", "Base"),
    ("polygon", "Polygon"),
    ("arbitrum", "Arbitrum"),
    ("optimism", "Optimism"),
    ("avalanche", "Avalanche"),
    ("linea", "Linea"),
    ("fantom", "Fantom"),
    ("pulse", "Pulse"),
    ("ronin", "Ronin"),
];

pub const DEFAULT_SEARCH_CHAINS: &[&str] = &[
    "eth", "bsc", "polygon", "arbitrum", "optimism", "solana", "base",
];

/// Chains queried for wallet net worth (EVM only).
pub const NET_WORTH_CHAINS: &[&str] = &[
    "eth",
    "bsc",
    "polygon",
    "arbitrum",
    "avalanche",
    "optimism",
    "linea",
    "pulse",
    "ronin",
    "base",
    "fantom",
];

const EXPLORERS: &[(&str, &str)] = &[
    ("0x1", "https://etherscan.io"),
    ("0x38", "https://bscscan.com"),
    ("0x89", "https://polygonscan.com"),
    ("0xa4b1", "https://arbiscan.io"),
    ("0xa", "https://optimistic.etherscan.io"),
    ("0x2105", "https://basescan.org"),
    ("0xa86a", "https://snowtrace.io"),
    ("0xe708", "https://lineascan.build"),
    ("0xfa", "https://ftmscan.com"),
    ("0x171", "https://scan.pulsechain.com"),
    ("0x7e4", "https://app.roninchain.com"),
    (SOLANA, "https://solscan.io"),
];

/// Resolves a route segment (`ethereum`, `bsc`, ...) to the id the API expects.
/// Unknown segments are assumed to already be chain ids.
pub fn chain_id_from_path(path: &str) -> String {
    let lower = path.to_ascii_lowercase();
    PATH_TO_CHAIN_ID
        .iter()
        .find(|(segment, _)| *segment == lower)
        .map(|(_, id)| id.to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Inverse of [`chain_id_from_path`], returning the segment the sidebar links to.
pub fn chain_path(chain_id: &str) -> String {
    let normalized = normalize_chain_id(chain_id);
    SIDEBAR_CHAINS
        .iter()
        .find(|(segment, _)| chain_id_from_path(segment) == normalized)
        .map(|(segment, _)| segment.to_string())
        .unwrap_or_else(|| chain_id.to_string())
}

/// Accepts either a hex id or a short name (`eth`, `bsc`) and returns the hex id.
pub fn normalize_chain_id(chain: &str) -> String {
    if chain.starts_with("0x") || chain == SOLANA {
        chain.to_ascii_lowercase()
    } else {
        chain_id_from_path(chain)
    }
}

pub fn chain_name(chain_id: &str) -> String {
    let path = chain_path(chain_id);
    SIDEBAR_CHAINS
        .iter()
        .find(|(segment, _)| *segment == path)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| chain_id.to_string())
}

pub fn is_solana(chain_id: &str) -> bool {
    chain_id.eq_ignore_ascii_case(SOLANA)
}

fn explorer(chain_id: &str) -> Option<&'static str> {
    let normalized = normalize_chain_id(chain_id);
    EXPLORERS
        .iter()
        .find(|(id, _)| *id == normalized)
        .map(|(_, url)| *url)
}

pub fn explorer_tx_url(chain_id: &str, tx_hash: &str) -> Option<String> {
    explorer(chain_id).map(|base| format!("{base}/tx/{tx_hash}"))
}

pub fn explorer_address_url(chain_id: &str, address: &str) -> Option<String> {
    explorer(chain_id).map(|base| {
        if is_solana(chain_id) {
            format!("{base}/account/{address}")
        } else {
            format!("{base}/address/{address}")
        }
    })
}
