//! Mock provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tragax_core::traits::TranslationProvider;

use crate::error::ProviderError;

/// A request as seen by [`MockProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    pub text: String,
    pub from: String,
    pub to: String,
}

/// A scripted translation provider for exercising the resolver without
/// network access.
///
/// Answers from a text → translation map (case-insensitive on the text),
/// then from a default response. Without a default, unknown text fails.
pub struct MockProvider {
    name: String,
    responses: HashMap<String, String>,
    default_response: Option<String>,
    fail_with: Option<String>,
    call_count: AtomicU32,
    last_request: Mutex<Option<MockRequest>>,
}

impl MockProvider {
    /// Create a mock with the given text→translation mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            name: "mock".to_string(),
            responses: responses
                .into_iter()
                .map(|(k, v)| (k.trim().to_lowercase(), v))
                .collect(),
            default_response: None,
            fail_with: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same translation.
    pub fn with_fixed_response(response: &str) -> Self {
        let mut mock = Self::new(HashMap::new());
        mock.default_response = Some(response.to_string());
        mock
    }

    /// Answer `response` for text with no scripted translation.
    pub fn with_default(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Create a mock whose every call fails with a network error.
    pub fn failing(message: &str) -> Self {
        let mut mock = Self::new(HashMap::new());
        mock.fail_with = Some(message.to_string());
        mock
    }

    /// Report a different provider name.
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<MockRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(MockRequest {
            text: text.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        });

        if let Some(message) = &self.fail_with {
            return Err(ProviderError::NetworkError(message.clone()));
        }

        self.responses
            .get(&text.trim().to_lowercase())
            .or(self.default_response.as_ref())
            .cloned()
            .ok_or_else(|| ProviderError::ApiError {
                status: 404,
                message: format!("no scripted translation for {text:?}"),
            })
    }
}
