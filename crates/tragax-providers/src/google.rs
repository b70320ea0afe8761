//! Google Cloud Translation (v2) provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tragax_core::traits::TranslationProvider;

use crate::error::ProviderError;
use crate::http;

const DEFAULT_BASE_URL: &str = "https://translation.googleapis.com";

/// Google Translate v2, authenticated with an API key.
pub struct GoogleProvider {
    api_key: String,
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, ProviderError> {
        let timeout_secs = timeout_secs.unwrap_or(http::DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs,
            client: http::client(timeout_secs)?,
        })
    }
}

#[derive(Serialize)]
struct GoogleRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Deserialize)]
struct GoogleResponse {
    data: GoogleData,
}

#[derive(Deserialize)]
struct GoogleData {
    translations: Vec<GoogleTranslation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleTranslation {
    translated_text: String,
}

#[async_trait]
impl TranslationProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    #[instrument(skip(self, text))]
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::AuthenticationFailed(
                "no Google API key configured".into(),
            ));
        }

        let url = http::url_with_params(
            &format!("{}/language/translate/v2", self.base_url),
            &[("key", self.api_key.as_str())],
        )?;
        let body = GoogleRequest {
            q: text,
            source: from,
            target: to,
            format: "text",
        };

        let response = http::send(self.client.post(url).json(&body), self.timeout_secs).await?;
        let response = http::check_status(response).await?;
        let api_response: GoogleResponse = http::parse_json(response).await?;

        api_response
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| ProviderError::ApiError {
                status: 200,
                message: "response contained no translations".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn successful_translation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .and(query_param("key", "test-key"))
            .and(body_json(serde_json::json!({
                "q": "window",
                "source": "en",
                "target": "fr",
                "format": "text"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"translations": [{"translatedText": "fenêtre"}]}
            })))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new("test-key", Some(server.uri()), None).unwrap();
        let text = provider.translate("window", "en", "fr").await.unwrap();
        assert_eq!(text, "fenêtre");
    }

    #[tokio::test]
    async fn rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "2"))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new("key", Some(server.uri()), None).unwrap();
        let err = provider.translate("window", "en", "fr").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::RateLimited {
                retry_after_ms: 2000
            }
        ));
    }

    #[tokio::test]
    async fn bad_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new("nope", Some(server.uri()), None).unwrap();
        let err = provider.translate("window", "en", "fr").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::AuthenticationFailed(ref m) if m.contains("not valid")
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = GoogleProvider::new("", Some(server.uri()), None).unwrap();
        let err = provider.translate("window", "en", "fr").await.unwrap_err();
        assert!(err.is_permanent());
    }

    #[tokio::test]
    async fn empty_translation_list() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": {"translations": []}})),
            )
            .mount(&server)
            .await;

        let provider = GoogleProvider::new("key", Some(server.uri()), None).unwrap();
        let err = provider.translate("window", "en", "fr").await.unwrap_err();
        assert!(matches!(err, ProviderError::ApiError { status: 200, .. }));
    }
}
