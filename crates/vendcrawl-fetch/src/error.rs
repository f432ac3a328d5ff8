use thiserror::Error;

/// Errors returned by the catalog fetch layer.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited at {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl FetchError {
    /// Returns `true` for errors worth another attempt after a back-off
    /// delay.
    ///
    /// **Transient:** rate limiting, network-level failures (timeout,
    /// connection reset) and HTTP 5xx.
    ///
    /// **Not transient:** 404, other 4xx, malformed bodies and malformed
    /// URLs — retrying returns the same result.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::RateLimited { .. } => true,
            FetchError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            FetchError::UnexpectedStatus { status, .. } => *status >= 500,
            FetchError::NotFound { .. }
            | FetchError::Deserialize { .. }
            | FetchError::InvalidUrl { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_is_transient() {
        let err = FetchError::RateLimited {
            url: "https://x.example".to_string(),
            retry_after_secs: 60,
        };
        assert!(err.is_transient());
    }

    #[test]
    fn server_error_status_is_transient() {
        let err = FetchError::UnexpectedStatus {
            status: 503,
            url: "https://x.example".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn client_error_status_is_not_transient() {
        let err = FetchError::UnexpectedStatus {
            status: 403,
            url: "https://x.example".to_string(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn deserialize_error_is_not_transient() {
        let source = serde_json::from_str::<()>("nope").unwrap_err();
        let err = FetchError::Deserialize {
            context: "test".to_string(),
            source,
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn not_found_is_not_transient() {
        let err = FetchError::NotFound {
            url: "https://x.example/menu".to_string(),
        };
        assert!(!err.is_transient());
    }
}
