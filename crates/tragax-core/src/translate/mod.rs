//! Translation resolver.
//!
//! Resolution order: cache, bundled dictionary, remote providers in priority
//! order, offline translator. The first three are deterministic for a fixed
//! cache; only the offline step involves randomness.

pub mod cache;
pub mod dictionary;
pub mod offline;

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::{ProviderError, VocabError, VocabResult};
use crate::lists::NewItem;
use crate::traits::TranslationProvider;

pub use cache::{CacheKey, CacheStats, TranslationCache};
pub use dictionary::{Dictionary, DictionaryEntry, DictionaryPack};
pub use offline::OfflineTranslator;

/// Lowercase, trim, drop punctuation other than `-`, `'` and `_`, and
/// collapse runs of whitespace. Used for cache and dictionary keys only.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '\'' | '_'))
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Where a translation came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "provider", rename_all = "lowercase")]
pub enum Origin {
    Cache,
    Dictionary,
    Provider(String),
    Offline,
}

/// A resolved translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub text: String,
    pub origin: Origin,
}

/// One entry of a batch translation. Failures do not abort the batch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchEntry {
    Translated {
        source: String,
        translation: Translation,
    },
    Failed {
        source: String,
        error: String,
    },
}

impl BatchEntry {
    pub fn source(&self) -> &str {
        match self {
            BatchEntry::Translated { source, .. } | BatchEntry::Failed { source, .. } => source,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            BatchEntry::Translated { translation, .. } => Some(&translation.text),
            BatchEntry::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchEntry::Failed { .. })
    }
}

/// Resolver tuning.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upper bound for a single provider call.
    pub provider_timeout: Duration,
    /// Batch entries resolved at once. 1 means sequential.
    pub batch_concurrency: usize,
    /// Pause between sequential batch entries.
    pub batch_delay: Duration,
    /// Fall back to the offline translator when every provider fails.
    /// When disabled the resolver reports `ProviderFailure` instead.
    pub offline_fallback: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(10),
            batch_concurrency: 1,
            batch_delay: Duration::ZERO,
            offline_fallback: true,
        }
    }
}

/// Resolves text in one language to another.
pub struct Resolver {
    cache: Arc<TranslationCache>,
    dictionary: Arc<Dictionary>,
    providers: Vec<Arc<dyn TranslationProvider>>,
    offline: OfflineTranslator,
    config: ResolverConfig,
}

impl Resolver {
    /// A resolver with no remote providers.
    pub fn new(cache: Arc<TranslationCache>, dictionary: Dictionary) -> Self {
        Self {
            cache,
            dictionary: Arc::new(dictionary),
            providers: Vec::new(),
            offline: OfflineTranslator::new(),
            config: ResolverConfig::default(),
        }
    }

    /// Append a provider at the lowest priority.
    pub fn with_provider(mut self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_providers(
        mut self,
        providers: impl IntoIterator<Item = Arc<dyn TranslationProvider>>,
    ) -> Self {
        self.providers.extend(providers);
        self
    }

    pub fn with_offline(mut self, offline: OfflineTranslator) -> Self {
        self.offline = offline;
        self
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Provider names in the order they are tried.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Translate one text.
    pub async fn resolve(&self, text: &str, from: &str, to: &str) -> VocabResult<Translation> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(VocabError::InvalidInput("text to translate is empty".into()));
        }

        let normalized = normalize(trimmed);
        let key = CacheKey::new(&normalized, from, to);

        if let Some(text) = self.cache.get(&key) {
            tracing::debug!(%normalized, from, to, "translation cache hit");
            return Ok(Translation {
                text,
                origin: Origin::Cache,
            });
        }

        if let Some(found) = self.dictionary.lookup(&normalized, from, to) {
            let text = found.to_string();
            self.cache.insert(key, text.clone());
            return Ok(Translation {
                text,
                origin: Origin::Dictionary,
            });
        }

        let mut last_error: Option<ProviderError> = None;
        for provider in &self.providers {
            match self.call_provider(provider.as_ref(), trimmed, from, to).await {
                Ok(text) => {
                    tracing::info!(
                        provider = provider.name(),
                        "translated {trimmed:?} -> {text:?}"
                    );
                    self.cache.insert(key, text.clone());
                    return Ok(Translation {
                        text,
                        origin: Origin::Provider(provider.name().to_string()),
                    });
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), "translation failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        if !self.config.offline_fallback {
            let reason = last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no providers configured".to_string());
            return Err(VocabError::ProviderFailure(reason));
        }

        if !self.providers.is_empty() {
            tracing::warn!("all providers failed, using offline translation for {trimmed:?}");
        }
        let text = self.offline.translate(&self.dictionary, trimmed, from, to);
        self.cache.insert(key, text.clone());
        Ok(Translation {
            text,
            origin: Origin::Offline,
        })
    }

    async fn call_provider(
        &self,
        provider: &dyn TranslationProvider,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<String, ProviderError> {
        let timeout = self.config.provider_timeout;
        let translated = tokio::time::timeout(timeout, provider.translate(text, from, to))
            .await
            .map_err(|_| ProviderError::Timeout(timeout.as_secs()))??;
        if translated.trim().is_empty() {
            return Err(ProviderError::ApiError {
                status: 0,
                message: "empty translation".into(),
            });
        }
        Ok(translated)
    }

    /// Translate each text independently. Order is preserved and a failing
    /// entry is reported in place rather than failing the batch.
    pub async fn resolve_many<S: AsRef<str>>(
        &self,
        texts: &[S],
        from: &str,
        to: &str,
    ) -> Vec<BatchEntry> {
        if self.config.batch_concurrency <= 1 {
            let mut entries = Vec::with_capacity(texts.len());
            for (i, text) in texts.iter().enumerate() {
                if i > 0 && !self.config.batch_delay.is_zero() {
                    tokio::time::sleep(self.config.batch_delay).await;
                }
                entries.push(self.batch_entry(text.as_ref(), from, to).await);
            }
            return entries;
        }

        stream::iter(texts.iter())
            .map(|text| self.batch_entry(text.as_ref(), from, to))
            .buffered(self.config.batch_concurrency)
            .collect()
            .await
    }

    async fn batch_entry(&self, text: &str, from: &str, to: &str) -> BatchEntry {
        match self.resolve(text, from, to).await {
            Ok(translation) => BatchEntry::Translated {
                source: text.to_string(),
                translation,
            },
            Err(e) => {
                tracing::warn!("batch translation of {text:?} failed: {e}");
                BatchEntry::Failed {
                    source: text.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Translate `text` into an unsaved item for a list of this pair.
    pub async fn translate_item(&self, text: &str, from: &str, to: &str) -> VocabResult<NewItem> {
        let translation = self.resolve(text, from, to).await?;
        Ok(NewItem::new(text.trim(), translation.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Scripted {
        name: &'static str,
        reply: Result<&'static str, &'static str>,
        delay: Duration,
        calls: AtomicU32,
    }

    impl Scripted {
        fn ok(name: &'static str, reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Ok(reply),
                delay: Duration::ZERO,
                calls: AtomicU32::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Err("boom"),
                delay: Duration::ZERO,
                calls: AtomicU32::new(0),
            })
        }

        fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Ok("trop tard"),
                delay,
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl TranslationProvider for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        async fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reply
                .map(str::to_string)
                .map_err(|e| ProviderError::NetworkError(e.into()))
        }
    }

    fn resolver() -> Resolver {
        Resolver::new(Arc::new(TranslationCache::new()), Dictionary::bundled())
            .with_offline(OfflineTranslator::with_seed(1).with_accent_probability(0.0))
    }

    #[test]
    fn normalize_strips_punctuation() {
        assert_eq!(normalize("  Hello, World!  "), "hello world");
        assert_eq!(normalize("S'il   vous plaît."), "s'il vous plaît");
        assert_eq!(normalize("well-known"), "well-known");
        assert_eq!(normalize("?!"), "");
    }

    #[tokio::test]
    async fn empty_text_is_invalid() {
        let err = resolver().resolve("   ", "en", "fr").await.unwrap_err();
        assert!(matches!(err, VocabError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn dictionary_before_providers() {
        let remote = Scripted::ok("remote", "salutations");
        let r = resolver().with_provider(remote.clone());

        let t = r.resolve("Hello", "en", "fr").await.unwrap();
        assert_eq!(t.text, "bonjour");
        assert_eq!(t.origin, Origin::Dictionary);
        assert_eq!(remote.calls(), 0);

        let again = r.resolve("hello!", "en", "fr").await.unwrap();
        assert_eq!(again.origin, Origin::Cache);
        assert_eq!(again.text, "bonjour");
    }

    #[tokio::test]
    async fn chain_falls_through_to_first_success() {
        let first = Scripted::failing("first");
        let second = Scripted::ok("second", "Fenêtre");
        let third = Scripted::ok("third", "unused");
        let r = resolver()
            .with_provider(first.clone())
            .with_provider(second.clone())
            .with_provider(third.clone());

        let t = r.resolve("window", "en", "fr").await.unwrap();
        assert_eq!(t.text, "Fenêtre");
        assert_eq!(t.origin, Origin::Provider("second".into()));
        assert_eq!((first.calls(), second.calls(), third.calls()), (1, 1, 0));

        // Cached: no further provider calls.
        let cached = r.resolve("Window", "en", "fr").await.unwrap();
        assert_eq!(cached.origin, Origin::Cache);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn exhausted_chain_uses_offline_translator() {
        let r = resolver().with_provider(Scripted::failing("down"));
        let t = r.resolve("famous", "en", "fr").await.unwrap();
        assert_eq!(t.origin, Origin::Offline);
        assert_eq!(t.text, "fameux");
        assert_eq!(r.cache().len(), 1);
    }

    #[tokio::test]
    async fn exhausted_chain_without_fallback_fails() {
        let r = resolver()
            .with_provider(Scripted::failing("down"))
            .with_config(ResolverConfig {
                offline_fallback: false,
                ..Default::default()
            });
        let err = r.resolve("famous", "en", "fr").await.unwrap_err();
        assert!(matches!(err, VocabError::ProviderFailure(ref m) if m.contains("boom")));
        assert!(r.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let slow = Scripted::slow("slow", Duration::from_secs(60));
        let backup = Scripted::ok("backup", "à l'heure");
        let r = resolver()
            .with_provider(slow.clone())
            .with_provider(backup.clone())
            .with_config(ResolverConfig {
                provider_timeout: Duration::from_secs(2),
                ..Default::default()
            });
        let t = r.resolve("on time", "en", "fr").await.unwrap();
        assert_eq!(t.text, "à l'heure");
        assert_eq!(slow.calls(), 1);
    }

    #[tokio::test]
    async fn batch_reports_failures_in_place() {
        let r = resolver();
        let texts = ["dog", "  ", "cat"];
        let entries = r.resolve_many(&texts, "en", "fr").await;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].text(), Some("chien"));
        assert!(entries[1].is_failed());
        assert_eq!(entries[1].source(), "  ");
        assert_eq!(entries[2].text(), Some("chat"));
    }

    #[tokio::test]
    async fn concurrent_batch_keeps_order() {
        let r = resolver().with_config(ResolverConfig {
            batch_concurrency: 4,
            ..Default::default()
        });
        let texts: Vec<String> = ["house", "car", "book", "world"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let out: Vec<_> = r
            .resolve_many(&texts, "en", "fr")
            .await
            .into_iter()
            .map(|e| e.text().unwrap().to_string())
            .collect();
        assert_eq!(out, vec!["maison", "voiture", "livre", "monde"]);
    }

    #[tokio::test]
    async fn translate_item_builds_draft() {
        let item = resolver().translate_item(" Dog ", "en", "fr").await.unwrap();
        assert_eq!(item.source_text, "Dog");
        assert_eq!(item.target_text, "chien");
    }
}
