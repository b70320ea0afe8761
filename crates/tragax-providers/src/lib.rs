//! tragax-providers: remote translation services.
//!
//! Implements the `TranslationProvider` trait for Google Translate,
//! LibreTranslate and MyMemory, plus a scripted mock, and loads the
//! `tragax.toml` configuration that decides which of them the resolver uses.

pub mod config;
pub mod error;
pub mod google;
mod http;
pub mod libre;
pub mod mock;
pub mod mymemory;

pub use config::{
    build_chain, build_resolver, create_provider, load_config, load_config_from,
    load_dictionary, ProviderConfig, TragaxConfig,
};
pub use error::ProviderError;
