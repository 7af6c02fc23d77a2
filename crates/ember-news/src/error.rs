use thiserror::Error;

/// Shown when the provider throttles us.
pub const RATE_LIMITED_MESSAGE: &str = "service is rate-limiting requests, retry shortly";
/// Shown for an empty area, whether the provider said so or just returned nothing.
pub const NO_STORIES_MESSAGE: &str = "no stories for this area yet";
/// Shown when the provider itself is failing (5xx).
pub const UNAVAILABLE_MESSAGE: &str =
    "search service couldn't load local stories right now, try again shortly";

/// Errors returned by search and enrichment providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The fetch was superseded. Never surfaced to the user.
    #[error("request cancelled")]
    Cancelled,

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("no results for this region")]
    NotFound,

    #[error("provider unavailable (HTTP {status})")]
    Unavailable { status: u16 },

    /// Any other provider-reported failure; the message is shown verbatim.
    #[error("{0}")]
    Failure(String),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ProviderError {
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ProviderError::Cancelled)
    }

    /// The user-facing `last_error` text for this error.
    ///
    /// `None` for cancellation, which is dropped silently.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            ProviderError::Cancelled => None,
            ProviderError::RateLimited { .. } => Some(RATE_LIMITED_MESSAGE.to_string()),
            ProviderError::NotFound => Some(NO_STORIES_MESSAGE.to_string()),
            ProviderError::Unavailable { .. } => Some(UNAVAILABLE_MESSAGE.to_string()),
            ProviderError::Failure(msg) => Some(msg.clone()),
            ProviderError::Http(_)
            | ProviderError::InvalidBaseUrl(_)
            | ProviderError::Deserialize { .. } => Some(self.to_string()),
        }
    }
}
