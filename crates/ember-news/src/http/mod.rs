//! HTTP adapters for the search and imagery services.
//!
//! Both services share a client setup, URL construction and the mapping from
//! HTTP status codes to [`ProviderError`] variants.

mod scene;
mod search;

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;

use crate::error::ProviderError;

pub use scene::HttpSceneClient;
pub use search::HttpSearchClient;

/// Used when the service omits or garbles `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ProviderError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parse `base_url`, forcing exactly one trailing slash so that endpoint
/// paths are joined beneath it instead of replacing its last segment.
pub(crate) fn normalise_base_url(base_url: &str) -> Result<Url, ProviderError> {
    let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
    Url::parse(&normalised)
        .map_err(|e| ProviderError::InvalidBaseUrl(format!("'{base_url}': {e}")))
}

/// Join `path` onto `base` and append percent-encoded query parameters.
///
/// `api_key`, when present, is appended last as `key`.
pub(crate) fn endpoint_url(
    base: &Url,
    path: &str,
    params: &[(&str, &str)],
    api_key: Option<&str>,
) -> Result<Url, ProviderError> {
    let mut url = base
        .join(path)
        .map_err(|e| ProviderError::InvalidBaseUrl(format!("'{base}' + '{path}': {e}")))?;
    {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k, v);
        }
        if let Some(key) = api_key {
            pairs.append_pair("key", key);
        }
    }
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-2xx response into the matching [`ProviderError`].
///
/// - 429 becomes [`ProviderError::RateLimited`], honouring `Retry-After`.
/// - 404 becomes [`ProviderError::NotFound`].
/// - 5xx becomes [`ProviderError::Unavailable`].
/// - Anything else becomes [`ProviderError::Failure`], carrying the
///   service's `{"error":{"message":..}}` text when the body has one.
///
/// Successful responses are passed through untouched.
pub(crate) async fn check_status(
    response: Response,
    service: &str,
) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Err(ProviderError::RateLimited { retry_after_secs });
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ProviderError::NotFound);
    }

    if status.is_server_error() {
        return Err(ProviderError::Unavailable {
            status: status.as_u16(),
        });
    }

    // Body is best-effort here; the status alone is enough to fail on.
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .ok()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("{service} request failed (HTTP {})", status.as_u16()));
    Err(ProviderError::Failure(message))
}
