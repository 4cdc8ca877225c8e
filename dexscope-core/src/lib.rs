pub mod api;
pub mod chain;
pub mod config;
pub mod discovery;
pub mod error;
pub mod feed;
pub mod format;
pub mod generation;
pub mod models;
pub mod panel;
pub mod portfolio;
pub mod search;
pub mod sort;
pub mod wallets;

pub use api::DexApiClient;
pub use error::{ApiError, ErrorKind, WalletError};
