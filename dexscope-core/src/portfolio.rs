use crate::chain::NET_WORTH_CHAINS;
use crate::models::{ChainNetWorth, NetWorth, WalletToken};
use std::cmp::Ordering;

/// Chain selector of the holdings table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChainFilter {
    /// Follow whichever chain holds the most value.
    #[default]
    All,
    Chain(String),
}

impl ChainFilter {
    pub fn label(&self) -> &str {
        match self {
            ChainFilter::All => "all",
            ChainFilter::Chain(chain) => chain,
        }
    }

    /// Steps through `all` and then each net-worth chain.
    pub fn cycle(&self, forward: bool) -> Self {
        let mut options: Vec<ChainFilter> = vec![ChainFilter::All];
        options.extend(
            NET_WORTH_CHAINS
                .iter()
                .map(|c| ChainFilter::Chain(c.to_string())),
        );
        let len = options.len();
        let index = options.iter().position(|o| o == self).unwrap_or(0);
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        options.swap_remove(next)
    }
}

impl NetWorth {
    /// Chain with the highest USD net worth.
    pub fn top_chain(&self) -> Option<&ChainNetWorth> {
        self.chains.iter().max_by(|a, b| {
            a.networth_usd
                .partial_cmp(&b.networth_usd)
                .unwrap_or(Ordering::Equal)
        })
    }

    /// Chains ordered by USD net worth, largest first.
    pub fn ranked_chains(&self) -> Vec<&ChainNetWorth> {
        let mut chains: Vec<&ChainNetWorth> = self.chains.iter().collect();
        chains.sort_by(|a, b| {
            b.networth_usd
                .partial_cmp(&a.networth_usd)
                .unwrap_or(Ordering::Equal)
        });
        chains
    }
}

/// Chain whose holdings should be listed, or `None` while net worth is unknown
/// and the filter is `all`.
pub fn resolve_chain(filter: &ChainFilter, net_worth: Option<&NetWorth>) -> Option<String> {
    match filter {
        ChainFilter::Chain(chain) => Some(chain.clone()),
        ChainFilter::All => net_worth
            .and_then(NetWorth::top_chain)
            .map(|c| c.chain.clone()),
    }
}

/// Largest USD position first; ties keep the API order.
pub fn sort_holdings(tokens: &mut [WalletToken]) {
    tokens.sort_by(|a, b| {
        b.usd_value
            .partial_cmp(&a.usd_value)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(name: &str, usd: f64) -> ChainNetWorth {
        ChainNetWorth {
            chain: name.to_string(),
            networth_usd: usd,
            ..Default::default()
        }
    }

    fn token(symbol: &str, usd: f64) -> WalletToken {
        WalletToken {
            symbol: Some(symbol.to_string()),
            usd_value: usd,
            ..Default::default()
        }
    }

    #[test]
    fn test_all_resolves_to_top_chain() {
        let worth = NetWorth {
            total_networth_usd: 1_600.0,
            chains: vec![chain("eth", 500.0), chain("base", 1_000.0), chain("bsc", 100.0)],
        };

        assert_eq!(worth.top_chain().map(|c| c.chain.as_str()), Some("base"));
        assert_eq!(resolve_chain(&ChainFilter::All, Some(&worth)).as_deref(), Some("base"));
        assert_eq!(
            resolve_chain(&ChainFilter::Chain("eth".into()), Some(&worth)).as_deref(),
            Some("eth")
        );
        assert_eq!(resolve_chain(&ChainFilter::All, None), None);

        let ranked: Vec<&str> = worth.ranked_chains().iter().map(|c| c.chain.as_str()).collect();
        assert_eq!(ranked, vec!["base", "eth", "bsc"]);
    }

    #[test]
    fn test_holdings_sorted_by_value() {
        let mut tokens = vec![token("A", 5.0), token("B", 50.0), token("C", 5.0), token("D", 0.5)];
        sort_holdings(&mut tokens);
        let order: Vec<&str> = tokens.iter().filter_map(|t| t.symbol.as_deref()).collect();
        assert_eq!(order, vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn test_filter_cycle() {
        let next = ChainFilter::All.cycle(true);
        assert_eq!(next, ChainFilter::Chain("eth".into()));
        assert_eq!(next.cycle(false), ChainFilter::All);
        assert_eq!(ChainFilter::All.cycle(false), ChainFilter::Chain("fantom".into()));
    }
}
