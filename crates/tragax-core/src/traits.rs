//! Core trait definitions for translation providers.
//!
//! Implemented by the `tragax-providers` crate for the remote HTTP services
//! and by test doubles.

use async_trait::async_trait;

use crate::error::ProviderError;

/// A remote translation service.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Human-readable provider name (e.g. "google").
    fn name(&self) -> &str;

    /// Translate `text` from language `from` to language `to`.
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError>;
}
