use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_solana_gateway_url")]
    pub solana_gateway_url: String,
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            solana_gateway_url: default_solana_gateway_url(),
            key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    /// Refresh period of a pair's swap feed.
    #[serde(default = "default_transactions_secs")]
    pub transactions_secs: u64,
    /// Refresh period of the pump.fun boards.
    #[serde(default = "default_token_board_secs")]
    pub token_board_secs: u64,
    /// How long newly merged rows stay highlighted.
    #[serde(default = "default_highlight_secs")]
    pub highlight_secs: u64,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    /// Upper bound on rows retained by a polled feed.
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            transactions_secs: default_transactions_secs(),
            token_board_secs: default_token_board_secs(),
            highlight_secs: default_highlight_secs(),
            search_debounce_ms: default_search_debounce_ms(),
            feed_capacity: default_feed_capacity(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_wallets_path")]
    pub wallets_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            wallets_path: default_wallets_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DexscopeConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl DexscopeConfig {
    pub fn from_env() -> Result<Self> {
        // Base values come from `config/default.(toml|yaml|json)` relative to the working
        // directory, then `DEXSCOPE__...` environment variables override them.
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("DEXSCOPE").separator("__"))
            .build()?;

        settings.try_deserialize().map_err(Into::into)
    }
}

fn default_base_url() -> String {
    "https://deep-index.moralis.io/api/v2.2".to_string()
}

fn default_solana_gateway_url() -> String {
    "https://solana-gateway.moralis.io".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_transactions_secs() -> u64 {
    10
}

fn default_token_board_secs() -> u64 {
    30
}

fn default_highlight_secs() -> u64 {
    5
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_feed_capacity() -> usize {
    1_000
}

fn default_wallets_path() -> String {
    "dexscope-wallets.json".to_string()
}
