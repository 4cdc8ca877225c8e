use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use dexscope_core::chain::{chain_id_from_path, normalize_chain_id};
use dexscope_core::config::DexscopeConfig;
use dotenv::dotenv;

use crate::app::Route;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartView {
    Trending,
    Pumpfun,
    Portfolio,
    Token,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// API key sent as X-API-Key
    #[arg(short = 'k', long, env = "DEXSCOPE_API_KEY")]
    pub api_key: Option<String>,

    /// Chain the trending list opens on (e.g. ethereum, bsc, solana)
    #[arg(short, long, env = "DEXSCOPE_CHAIN")]
    pub chain: Option<String>,

    /// View shown at startup
    #[arg(short, long, value_enum, default_value_t = StartView::Trending)]
    pub view: StartView,

    /// Token opened by `--view token`, as <chain>/<address>
    #[arg(long)]
    pub token: Option<String>,

    /// Wallet list file
    #[arg(short, long, env = "DEXSCOPE_WALLETS")]
    pub wallets: Option<String>,

    /// Log file (the terminal owns stdout)
    #[arg(long, env = "DEXSCOPE_LOG_FILE", default_value = "dexscope.log")]
    pub log_file: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub config: DexscopeConfig,
    pub start: Route,
    pub log_file: String,
}

pub fn load_config() -> Result<Settings> {
    dotenv().ok();
    let args = Args::parse();
    let config = DexscopeConfig::from_env().context("failed to read configuration")?;
    resolve(args, config)
}

/// Applies command-line overrides on top of the file/environment config.
pub fn resolve(args: Args, mut config: DexscopeConfig) -> Result<Settings> {
    if let Some(key) = args.api_key.filter(|k| !k.trim().is_empty()) {
        config.api.key = key;
    }
    if let Some(path) = args.wallets {
        config.storage.wallets_path = path;
    }

    let start = match args.view {
        StartView::Trending => Route::Trending {
            chain: args.chain.as_deref().map(chain_id_from_path),
        },
        StartView::Pumpfun => Route::PumpFun,
        StartView::Portfolio => Route::Portfolio,
        StartView::Token => {
            let Some(token) = args.token.as_deref() else {
                bail!("--view token needs --token <chain>/<address>");
            };
            parse_token_route(token)?
        }
    };

    Ok(Settings {
        config,
        start,
        log_file: args.log_file,
    })
}

fn parse_token_route(value: &str) -> Result<Route> {
    match value.split_once('/') {
        Some((chain, address)) if !chain.is_empty() && !address.is_empty() => Ok(Route::Token {
            chain: normalize_chain_id(chain),
            address: address.to_string(),
        }),
        _ => bail!("invalid token '{value}', expected <chain>/<address>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("dexscope").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = parse(&["--api-key", "secret", "--wallets", "/tmp/w.json", "--chain", "bsc"]);
        let settings = resolve(args, DexscopeConfig::default()).unwrap();

        assert_eq!(settings.config.api.key, "secret");
        assert_eq!(settings.config.storage.wallets_path, "/tmp/w.json");
        assert_eq!(
            settings.start,
            Route::Trending {
                chain: Some("0x38".to_string())
            }
        );
        assert_eq!(settings.log_file, "dexscope.log");
    }

    #[test]
    fn test_token_view_requires_token() {
        let args = parse(&["--view", "token"]);
        assert!(resolve(args, DexscopeConfig::default()).is_err());

        let args = parse(&["--view", "token", "--token", "eth/0xabc"]);
        let settings = resolve(args, DexscopeConfig::default()).unwrap();
        assert_eq!(
            settings.start,
            Route::Token {
                chain: "0x1".to_string(),
                address: "0xabc".to_string()
            }
        );

        let args = parse(&["--view", "token", "--token", "nochain"]);
        assert!(resolve(args, DexscopeConfig::default()).is_err());
    }

    #[test]
    fn test_other_views() {
        let settings = resolve(parse(&["-v", "pumpfun"]), DexscopeConfig::default()).unwrap();
        assert_eq!(settings.start, Route::PumpFun);
        let settings = resolve(parse(&["--view", "portfolio"]), DexscopeConfig::default()).unwrap();
        assert_eq!(settings.start, Route::Portfolio);
    }
}
