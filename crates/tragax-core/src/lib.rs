//! tragax-core: vocabulary lists, translation resolution and study sessions.
//!
//! This crate defines the data model, the store and provider traits, and the
//! engines built on them: the translation resolver, the list manager, and
//! the learning and quiz sessions.

pub mod accounts;
pub mod error;
pub mod learning;
pub mod lists;
pub mod model;
pub mod quiz;
pub mod statistics;
pub mod store;
pub mod traits;
pub mod translate;

pub use error::{ProviderError, StoreError, VocabError, VocabResult};
