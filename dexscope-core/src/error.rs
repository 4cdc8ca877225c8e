use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("API error: {status} from {endpoint}")]
    Status { status: u16, endpoint: String },
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{what} is not available on chain {chain}")]
    Unsupported { what: &'static str, chain: String },
    #[error("no API key configured")]
    MissingApiKey,
}

/// Coarse classification used to pick the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Auth,
    RateLimit,
    Status(u16),
    Decode,
    Unsupported,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Client(_) | ApiError::Network { .. } => ErrorKind::Network,
            ApiError::MissingApiKey => ErrorKind::Auth,
            ApiError::Status { status, .. } => match status {
                401 | 403 => ErrorKind::Auth,
                429 => ErrorKind::RateLimit,
                other => ErrorKind::Status(*other),
            },
            ApiError::Decode { .. } => ErrorKind::Decode,
            ApiError::Unsupported { .. } => ErrorKind::Unsupported,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self.kind() {
            ErrorKind::Network => "Network error, please check your connection".to_string(),
            ErrorKind::Auth => "Authentication error, please check your API key".to_string(),
            ErrorKind::RateLimit => "Rate limit exceeded, please try again later".to_string(),
            ErrorKind::Status(code) => format!("Something went wrong (ERROR_{code})"),
            ErrorKind::Decode => "The API returned data in an unexpected shape".to_string(),
            ErrorKind::Unsupported => self.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Please enter a wallet name")]
    EmptyName,
    #[error("Please enter a wallet address")]
    EmptyAddress,
    #[error("Please enter a valid EVM wallet address")]
    InvalidAddress,
    #[error("This wallet is already being tracked")]
    Duplicate,
    #[error("wallet file uses unsupported format version {0}")]
    UnsupportedVersion(u32),
    #[error("wallet file is unreadable: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("failed to persist wallets: {0}")]
    Storage(#[from] std::io::Error),
}

impl WalletError {
    /// Validation failures are shown inline next to the form; everything else is a storage problem.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WalletError::EmptyName
                | WalletError::EmptyAddress
                | WalletError::InvalidAddress
                | WalletError::Duplicate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ApiError {
        ApiError::Status {
            status: code,
            endpoint: "https://example.test/tokens/trending".to_string(),
        }
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(status(401).kind(), ErrorKind::Auth);
        assert_eq!(status(403).kind(), ErrorKind::Auth);
        assert_eq!(status(429).kind(), ErrorKind::RateLimit);
        assert_eq!(status(500).kind(), ErrorKind::Status(500));
        assert_eq!(status(404).status(), Some(404));
    }

    #[test]
    fn test_status_code_is_surfaced() {
        let err = status(502);
        assert!(err.to_string().contains("502"));
        assert!(err.message().contains("ERROR_502"));
    }

    #[test]
    fn test_validation_errors_are_inline() {
        assert!(WalletError::InvalidAddress.is_validation());
        assert!(WalletError::Duplicate.is_validation());
        assert!(!WalletError::UnsupportedVersion(9).is_validation());
    }
}
