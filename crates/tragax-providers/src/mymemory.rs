//! MyMemory provider.
//!
//! MyMemory answers HTTP 200 even for failed translations; the outcome is in
//! the `responseStatus` field, which may be a number or a numeric string.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use tragax_core::traits::TranslationProvider;

use crate::error::ProviderError;
use crate::http;

const DEFAULT_BASE_URL: &str = "https://api.mymemory.translated.net";

/// The free MyMemory translation memory API.
pub struct MyMemoryProvider {
    /// Contact email, raises the anonymous daily quota.
    email: Option<String>,
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl MyMemoryProvider {
    pub fn new(
        email: Option<String>,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, ProviderError> {
        let timeout_secs = timeout_secs.unwrap_or(http::DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            email: email.filter(|e| !e.is_empty()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs,
            client: http::client(timeout_secs)?,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: Option<MyMemoryData>,
    response_status: serde_json::Value,
    #[serde(default)]
    response_details: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryData {
    translated_text: String,
}

fn status_code(value: &serde_json::Value) -> Option<u16> {
    value
        .as_u64()
        .and_then(|n| u16::try_from(n).ok())
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

#[async_trait]
impl TranslationProvider for MyMemoryProvider {
    fn name(&self) -> &str {
        "mymemory"
    }

    #[instrument(skip(self, text))]
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError> {
        let pair = format!("{from}|{to}");
        let mut params = vec![("q", text), ("langpair", pair.as_str())];
        if let Some(email) = &self.email {
            params.push(("de", email.as_str()));
        }
        let url = http::url_with_params(&format!("{}/get", self.base_url), &params)?;

        let response = http::send(self.client.get(url), self.timeout_secs).await?;
        let response = http::check_status(response).await?;
        let api_response: MyMemoryResponse = http::parse_json(response).await?;

        let status = status_code(&api_response.response_status).unwrap_or(0);
        if status != 200 {
            let message = api_response
                .response_details
                .unwrap_or_else(|| "translation failed".into());
            if status == 403 && message.to_uppercase().contains("LANGPAIR") {
                return Err(ProviderError::UnsupportedPair {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
            if status == 429 {
                return Err(ProviderError::RateLimited {
                    retry_after_ms: 60_000,
                });
            }
            return Err(ProviderError::ApiError { status, message });
        }

        api_response
            .response_data
            .map(|d| d.translated_text)
            .ok_or_else(|| ProviderError::ApiError {
                status,
                message: "response contained no translation".into(),
            })
    }
}
