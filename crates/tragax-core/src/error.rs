//! Error types.
//!
//! `VocabError` is the taxonomy every public operation reports. Provider and
//! store failures have their own enums so callers can classify them without
//! string matching; both fold into `VocabError` at the crate boundary.

use thiserror::Error;

/// Errors reported by list management, sessions, accounts and the resolver.
#[derive(Debug, Error)]
pub enum VocabError {
    /// Empty text, empty name, zero count, and similar caller mistakes.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A user, list, item or result id does not resolve.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A username or email is already registered.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Session setup produced no candidate items.
    #[error("no items match the session settings")]
    EmptySelection,

    /// Quiz setup selected no question type.
    #[error("select at least one question type")]
    NoTypeSelected,

    /// The session already reached its terminal state.
    #[error("session is already finished")]
    SessionClosed,

    /// Every translation provider failed.
    #[error("all translation providers failed: {0}")]
    ProviderFailure(String),

    /// The store rejected an operation. Not retried.
    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] StoreError),

    /// bcrypt could not produce a password hash.
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

impl VocabError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        VocabError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type VocabResult<T> = Result<T, VocabError>;

/// Errors that can occur when calling a remote translation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (missing or invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The provider does not translate between these languages.
    #[error("unsupported language pair {from}->{to}")]
    UnsupportedPair { from: String, to: String },

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::UnsupportedPair { .. }
        )
    }
}

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("record has no string `id` field")]
    MissingId,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
