//! LibreTranslate provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tragax_core::traits::TranslationProvider;

use crate::error::ProviderError;
use crate::http;

const DEFAULT_BASE_URL: &str = "https://libretranslate.de";

/// A LibreTranslate instance. Public instances usually need no key.
pub struct LibreProvider {
    api_key: Option<String>,
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl LibreProvider {
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, ProviderError> {
        let timeout_secs = timeout_secs.unwrap_or(http::DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs,
            client: http::client(timeout_secs)?,
        })
    }
}

#[derive(Serialize)]
struct LibreRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LibreResponse {
    translated_text: String,
}

#[derive(Deserialize)]
struct LibreError {
    error: String,
}

#[async_trait]
impl TranslationProvider for LibreProvider {
    fn name(&self) -> &str {
        "libre"
    }

    #[instrument(skip(self, text))]
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError> {
        let body = LibreRequest {
            q: text,
            source: from,
            target: to,
            api_key: self.api_key.as_deref(),
        };

        let response = http::send(
            self.client
                .post(format!("{}/translate", self.base_url))
                .json(&body),
            self.timeout_secs,
        )
        .await?;

        // Unsupported languages come back as 400 with a JSON error body.
        if response.status().as_u16() == 400 {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<LibreError>(&raw)
                .map(|e| e.error)
                .unwrap_or(raw);
            if message.to_lowercase().contains("not supported") {
                return Err(ProviderError::UnsupportedPair {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
            return Err(ProviderError::ApiError {
                status: 400,
                message,
            });
        }

        let response = http::check_status(response).await?;
        let api_response: LibreResponse = http::parse_json(response).await?;
        Ok(api_response.translated_text)
    }
}
