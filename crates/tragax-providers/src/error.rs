//! Provider error types.
//!
//! The error enum lives in `tragax-core` so the resolver can classify
//! failures; it is re-exported here for provider implementors.

pub use tragax_core::error::ProviderError;

/// Fold a `reqwest` transport error into a [`ProviderError`].
pub(crate) fn from_reqwest(e: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::NetworkError(e.to_string())
    }
}
