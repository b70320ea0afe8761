//! HTTP plumbing shared by the remote providers.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{from_reqwest, ProviderError};

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub(crate) fn client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProviderError::NetworkError(format!("failed to build HTTP client: {e}")))
}

pub(crate) fn url_with_params(
    base: &str,
    params: &[(&str, &str)],
) -> Result<reqwest::Url, ProviderError> {
    reqwest::Url::parse_with_params(base, params)
        .map_err(|e| ProviderError::NetworkError(format!("invalid URL {base}: {e}")))
}

/// Send a request, mapping transport failures.
pub(crate) async fn send(
    request: reqwest::RequestBuilder,
    timeout_secs: u64,
) -> Result<reqwest::Response, ProviderError> {
    request.send().await.map_err(|e| from_reqwest(e, timeout_secs))
}

/// Map error statuses. 429 carries `retry-after`, 401/403 mean a bad key.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            * 1000;
        return Err(ProviderError::RateLimited {
            retry_after_ms: retry_after,
        });
    }
    if status == 401 || status == 403 {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::AuthenticationFailed(body));
    }
    if status >= 400 {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::ApiError {
            status,
            message: body,
        });
    }
    Ok(response)
}

pub(crate) async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    response.json().await.map_err(|e| ProviderError::ApiError {
        status: 0,
        message: format!("failed to parse response: {e}"),
    })
}
