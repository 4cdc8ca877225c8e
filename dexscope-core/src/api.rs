//! Client for the token data REST API. EVM chains go to the main index API, Solana
//! requests go to the Solana gateway.

use crate::chain::{is_solana, normalize_chain_id};
use crate::config::ApiConfig;
use crate::discovery::{summarize, DiscoveryItem, DiscoveryRequest};
use crate::error::ApiError;
use crate::models::{
    HolderInsights, HolderPage, Listing, NetWorth, Pair, PairStats, PairsResponse, PumpStage,
    PumpToken, SearchResult, Sniper, SwapPage, TokenMetadata, TokenPrice, TokenSummary,
    WalletToken,
};
use crate::portfolio::sort_holdings;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_TRENDING_LIMIT: u32 = 100;
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
pub const DEFAULT_SNIPER_BLOCKS: u32 = 1_000;
pub const PUMPFUN_LIMIT: u32 = 100;

#[derive(Clone)]
pub struct DexApiClient {
    client: reqwest::Client,
    base_url: String,
    gateway_url: String,
    api_key: String,
}

impl DexApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            gateway_url: config.solana_gateway_url.trim_end_matches('/').to_string(),
            api_key: config.key.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn index(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn gateway(&self, path: &str) -> String {
        format!("{}/token/mainnet/{}", self.gateway_url, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.client.get(&url).query(query);
        self.send(&url, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let result = self.execute(endpoint, request).await;
        if let Err(err) = &result {
            error!(endpoint, error = %err, "API request failed");
        }
        result
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        if self.api_key.is_empty() {
            return Err(ApiError::MissingApiKey);
        }
        debug!(endpoint, "calling API");

        let response = request
            .header("accept", "application/json")
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .map_err(|source| ApiError::Network {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let body = response.text().await.map_err(|source| ApiError::Network {
            endpoint: endpoint.to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    fn evm_only(what: &'static str, chain: &str) -> Result<(), ApiError> {
        if is_solana(chain) {
            return Err(ApiError::Unsupported {
                what,
                chain: chain.to_string(),
            });
        }
        Ok(())
    }

    pub async fn trending_tokens(
        &self,
        chain: Option<&str>,
        limit: u32,
    ) -> Result<Vec<TokenSummary>, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(chain) = chain.filter(|c| !c.is_empty()) {
            query.push(("chain", normalize_chain_id(chain)));
        }
        let listing: Listing<TokenSummary> =
            self.get(self.index("tokens/trending"), &query).await?;
        Ok(listing.into_vec())
    }

    pub async fn search_tokens(
        &self,
        query: &str,
        chains: &[&str],
        limit: u32,
    ) -> Result<Vec<SearchResult>, ApiError> {
        let params = [
            ("query", query.to_string()),
            ("chains", chains.join(",")),
            ("limit", limit.to_string()),
        ];
        let listing: Listing<SearchResult> =
            self.get(self.index("tokens/search"), &params).await?;
        Ok(listing.into_vec())
    }

    pub async fn token_price(&self, chain: &str, address: &str) -> Result<TokenPrice, ApiError> {
        let chain = normalize_chain_id(chain);
        if is_solana(&chain) {
            return self.get(self.gateway(&format!("{address}/price")), &[]).await;
        }
        self.get(self.index(&format!("tokens/{chain}/{address}/price")), &[])
            .await
    }

    /// Metadata of one token. EVM answers with a list; an empty list yields `None`.
    pub async fn token_metadata(
        &self,
        chain: &str,
        address: &str,
    ) -> Result<Option<TokenMetadata>, ApiError> {
        let chain = normalize_chain_id(chain);
        if is_solana(&chain) {
            let metadata: TokenMetadata =
                self.get(self.gateway(&format!("{address}/metadata")), &[]).await?;
            return Ok(Some(metadata));
        }
        let query = [("chain", chain), ("addresses[0]", address.to_string())];
        let listing: Listing<TokenMetadata> =
            self.get(self.index("erc20/metadata"), &query).await?;
        Ok(listing.into_vec().into_iter().next())
    }

    pub async fn token_pairs(&self, chain: &str, address: &str) -> Result<Vec<Pair>, ApiError> {
        let chain = normalize_chain_id(chain);
        let response: PairsResponse = if is_solana(&chain) {
            self.get(self.gateway(&format!("{address}/pairs")), &[]).await?
        } else {
            let query = [("chain", chain.clone())];
            self.get(self.index(&format!("erc20/{address}/pairs")), &query)
                .await?
        };
        Ok(response
            .pairs
            .into_iter()
            .map(|mut pair| {
                if pair.chain_id.is_empty() {
                    pair.chain_id = chain.clone();
                }
                pair
            })
            .collect())
    }

    pub async fn pair_stats(&self, chain: &str, pair: &str) -> Result<PairStats, ApiError> {
        let chain = normalize_chain_id(chain);
        if is_solana(&chain) {
            return self.get(self.gateway(&format!("pairs/{pair}/stats")), &[]).await;
        }
        let query = [("chain", chain)];
        self.get(self.index(&format!("pairs/{pair}/stats")), &query)
            .await
    }

    /// Most recent swaps first. Pass the previous page's cursor to continue.
    pub async fn pair_swaps(
        &self,
        chain: &str,
        pair: &str,
        cursor: Option<&str>,
    ) -> Result<SwapPage, ApiError> {
        let chain = normalize_chain_id(chain);
        let mut query = vec![("order", "DESC".to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        if is_solana(&chain) {
            return self
                .get(self.gateway(&format!("pairs/{pair}/swaps")), &query)
                .await;
        }
        query.push(("chain", chain));
        self.get(self.index(&format!("pairs/{pair}/swaps")), &query)
            .await
    }

    pub async fn token_holders(
        &self,
        chain: &str,
        address: &str,
        cursor: Option<&str>,
    ) -> Result<HolderPage, ApiError> {
        let chain = normalize_chain_id(chain);
        Self::evm_only("holder listing", &chain)?;
        let mut query = vec![("chain", chain), ("order", "DESC".to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.get(self.index(&format!("erc20/{address}/owners")), &query)
            .await
    }

    pub async fn holder_insights(
        &self,
        chain: &str,
        address: &str,
    ) -> Result<HolderInsights, ApiError> {
        let chain = normalize_chain_id(chain);
        Self::evm_only("holder insights", &chain)?;
        let query = [("chain", chain)];
        self.get(self.index(&format!("erc20/{address}/holders")), &query)
            .await
    }

    pub async fn pair_snipers(
        &self,
        chain: &str,
        pair: &str,
        blocks_after_creation: u32,
    ) -> Result<Vec<Sniper>, ApiError> {
        let chain = normalize_chain_id(chain);
        let mut query = vec![("blocksAfterCreation", blocks_after_creation.to_string())];
        let listing: Listing<Sniper> = if is_solana(&chain) {
            self.get(self.gateway(&format!("pairs/{pair}/snipers")), &query)
                .await?
        } else {
            query.push(("chain", chain));
            self.get(self.index(&format!("pairs/{pair}/snipers")), &query)
                .await?
        };
        Ok(listing.into_vec())
    }

    pub async fn wallet_net_worth(
        &self,
        address: &str,
        chains: &[&str],
    ) -> Result<NetWorth, ApiError> {
        let keys: Vec<String> = (0..chains.len()).map(|i| format!("chains[{i}]")).collect();
        let mut query: Vec<(&str, String)> = keys
            .iter()
            .zip(chains)
            .map(|(key, chain)| (key.as_str(), chain.to_string()))
            .collect();
        query.push(("exclude_spam", "true".to_string()));
        query.push(("exclude_unverified_contracts", "true".to_string()));
        self.get(self.index(&format!("wallets/{address}/net-worth")), &query)
            .await
    }

    /// Token balances of a wallet on one chain, largest USD value first.
    pub async fn wallet_tokens(
        &self,
        address: &str,
        chain: &str,
    ) -> Result<Vec<WalletToken>, ApiError> {
        let query = [("chain", chain.to_string())];
        let listing: Listing<WalletToken> = self
            .get(self.index(&format!("wallets/{address}/tokens")), &query)
            .await?;
        let mut tokens: Vec<WalletToken> = listing
            .into_vec()
            .into_iter()
            .map(|mut token| {
                token.chain = chain.to_string();
                token
            })
            .collect();
        sort_holdings(&mut tokens);
        Ok(tokens)
    }

    /// Runs a discovery query and reshapes the results into trending rows.
    pub async fn discover_tokens(
        &self,
        request: &DiscoveryRequest,
    ) -> Result<Vec<TokenSummary>, ApiError> {
        let url = self.index("discovery/tokens");
        let payload = request.to_payload();
        debug!(%payload, "discovery request");
        let builder = self.client.post(&url).json(&payload);
        let listing: Listing<DiscoveryItem> = self.send(&url, builder).await?;
        Ok(listing.into_vec().into_iter().map(summarize).collect())
    }

    pub async fn pumpfun_tokens(
        &self,
        stage: PumpStage,
        limit: u32,
    ) -> Result<Vec<PumpToken>, ApiError> {
        let url = format!(
            "{}/token/mainnet/exchange/pumpfun/{}",
            self.gateway_url,
            stage.endpoint()
        );
        let listing: Listing<PumpToken> = self.get(url, &[("limit", limit.to_string())]).await?;
        Ok(listing.into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn config(base: &str, key: &str) -> ApiConfig {
        ApiConfig {
            base_url: base.to_string(),
            solana_gateway_url: base.to_string(),
            key: key.to_string(),
            timeout_secs: 5,
        }
    }

    /// Serves one canned HTTP response and hands back the raw request head.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let client = DexApiClient::new(&config("http://127.0.0.1:9", "")).unwrap();
        assert!(!client.has_api_key());
        let err = client.trending_tokens(None, 10).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingApiKey));
        assert_eq!(err.kind(), ErrorKind::Auth);
    }

    #[tokio::test]
    async fn test_holders_unsupported_on_solana() {
        let client = DexApiClient::new(&config("http://127.0.0.1:9", "key")).unwrap();
        let err = client.token_holders("solana", "So1", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        let err = client.holder_insights("solana", "So1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[tokio::test]
    async fn test_trending_sends_key_and_reads_envelope() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"result":[{"tokenAddress":"0xabc","symbol":"PEPE","usdPrice":"0.5"}]}"#,
        )
        .await;
        let client = DexApiClient::new(&config(&base, "secret")).unwrap();

        let tokens = client.trending_tokens(Some("bsc"), 25).await.unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].display_symbol(), "PEPE");
        assert_eq!(tokens[0].usd_price, 0.5);

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /tokens/trending?limit=25&chain=0x38 "));
        assert!(request.contains("x-api-key: secret"));
        assert!(request.contains("accept: application/json"));
    }

    #[tokio::test]
    async fn test_status_is_surfaced() {
        let (base, server) = serve_once("429 Too Many Requests", "").await;
        let client = DexApiClient::new(&config(&base, "secret")).unwrap();

        let err = client.search_tokens("pepe", &["eth"], 5).await.unwrap_err();
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_body_is_decode_error() {
        let (base, server) = serve_once("200 OK", "<html>oops</html>").await;
        let client = DexApiClient::new(&config(&base, "secret")).unwrap();

        let err = client.pair_stats("0x1", "0xpair").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_wallet_tokens_sorted_and_tagged() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"result":[{"symbol":"A","usd_value":1.5},{"symbol":"B","usd_value":"90"}]}"#,
        )
        .await;
        let client = DexApiClient::new(&config(&base, "secret")).unwrap();

        let tokens = client.wallet_tokens("0xwallet", "base").await.unwrap();
        let symbols: Vec<&str> = tokens.iter().filter_map(|t| t.symbol.as_deref()).collect();
        assert_eq!(symbols, vec!["B", "A"]);
        assert!(tokens.iter().all(|t| t.chain == "base"));
        server.await.unwrap();
    }
}
