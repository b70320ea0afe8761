//! Configuration and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tragax_core::traits::TranslationProvider;
use tragax_core::translate::{
    Dictionary, DictionaryPack, Resolver, ResolverConfig, TranslationCache,
};

use crate::google::GoogleProvider;
use crate::libre::LibreProvider;
use crate::mock::MockProvider;
use crate::mymemory::MyMemoryProvider;

/// Configuration for a single translation provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Google {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Libre {
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        base_url: Option<String>,
    },
    MyMemory {
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        base_url: Option<String>,
    },
    /// Scripted answers, for demos and tests.
    Mock {
        #[serde(default)]
        responses: HashMap<String, String>,
        #[serde(default)]
        default_response: Option<String>,
        #[serde(default)]
        fail: bool,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Google {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Google")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Libre { api_key, base_url } => f
                .debug_struct("Libre")
                .field("api_key", &api_key.as_ref().map(|_| "***"))
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::MyMemory { email, base_url } => f
                .debug_struct("MyMemory")
                .field("email", email)
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Mock {
                responses,
                default_response,
                fail,
            } => f
                .debug_struct("Mock")
                .field("responses", &responses.len())
                .field("default_response", default_response)
                .field("fail", fail)
                .finish(),
        }
    }
}

/// Top-level tragax configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TragaxConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider names in the order the resolver tries them. Configured
    /// providers not listed here are tried afterwards, by name.
    #[serde(default = "default_provider_order")]
    pub provider_order: Vec<String>,
    #[serde(default = "default_source_language")]
    pub default_source_language: String,
    #[serde(default = "default_target_language")]
    pub default_target_language: String,
    /// Upper bound for one provider call.
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,
    /// Batch translations resolved at once. 1 means sequential.
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
    /// Pause between sequential batch translations, in milliseconds.
    #[serde(default = "default_batch_delay")]
    pub batch_delay_ms: u64,
    /// Use the offline translator when every provider fails.
    #[serde(default = "default_true")]
    pub offline_fallback: bool,
    /// JSON store holding users, lists, items and quiz results.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Extra dictionary packs (JSON) loaded on top of the bundled one.
    #[serde(default)]
    pub dictionaries: Vec<PathBuf>,
    /// Translation cache entries kept before the cache is emptied.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// bcrypt work factor for new password hashes.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_provider_order() -> Vec<String> {
    vec!["google".into(), "libre".into(), "mymemory".into()]
}
fn default_source_language() -> String {
    tragax_core::model::DEFAULT_SOURCE_LANGUAGE.to_string()
}
fn default_target_language() -> String {
    tragax_core::model::DEFAULT_TARGET_LANGUAGE.to_string()
}
fn default_provider_timeout() -> u64 {
    10
}
fn default_batch_concurrency() -> usize {
    1
}
fn default_batch_delay() -> u64 {
    100
}
fn default_true() -> bool {
    true
}
fn default_data_file() -> PathBuf {
    PathBuf::from("./tragax-data.json")
}
fn default_cache_capacity() -> usize {
    TranslationCache::DEFAULT_CAPACITY
}
fn default_bcrypt_cost() -> u32 {
    10
}

impl Default for TragaxConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            provider_order: default_provider_order(),
            default_source_language: default_source_language(),
            default_target_language: default_target_language(),
            provider_timeout_secs: default_provider_timeout(),
            batch_concurrency: default_batch_concurrency(),
            batch_delay_ms: default_batch_delay(),
            offline_fallback: true,
            data_file: default_data_file(),
            dictionaries: Vec::new(),
            cache_capacity: default_cache_capacity(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl TragaxConfig {
    /// Resolver tuning derived from this configuration.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            provider_timeout: Duration::from_secs(self.provider_timeout_secs),
            batch_concurrency: self.batch_concurrency.max(1),
            batch_delay: Duration::from_millis(self.batch_delay_ms),
            offline_fallback: self.offline_fallback,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_opt(value: &Option<String>) -> Option<String> {
    value.as_deref().map(resolve_env_vars)
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Google { api_key, base_url } => ProviderConfig::Google {
            api_key: resolve_env_vars(api_key),
            base_url: resolve_opt(base_url),
        },
        ProviderConfig::Libre { api_key, base_url } => ProviderConfig::Libre {
            api_key: resolve_opt(api_key),
            base_url: resolve_opt(base_url),
        },
        ProviderConfig::MyMemory { email, base_url } => ProviderConfig::MyMemory {
            email: resolve_opt(email),
            base_url: resolve_opt(base_url),
        },
        mock @ ProviderConfig::Mock { .. } => mock.clone(),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `tragax.toml` in the current directory
/// 2. `~/.config/tragax/config.toml`
///
/// Environment variable overrides: `TRAGAX_GOOGLE_KEY`, `TRAGAX_LIBRE_KEY`.
pub fn load_config() -> Result<TragaxConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TragaxConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("tragax.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<TragaxConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TragaxConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("TRAGAX_GOOGLE_KEY") {
        config
            .providers
            .entry("google".into())
            .or_insert(ProviderConfig::Google {
                api_key: String::new(),
                base_url: None,
            });
        if let Some(ProviderConfig::Google { api_key, .. }) = config.providers.get_mut("google") {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("TRAGAX_LIBRE_KEY") {
        config
            .providers
            .entry("libre".into())
            .or_insert(ProviderConfig::Libre {
                api_key: None,
                base_url: None,
            });
        if let Some(ProviderConfig::Libre { api_key, .. }) = config.providers.get_mut("libre") {
            *api_key = Some(key);
        }
    }

    // Resolve env vars in all provider configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    // Relative data and dictionary paths are taken from the config file's directory.
    if let Some(base) = config_path.as_deref().and_then(Path::parent) {
        if !base.as_os_str().is_empty() {
            if config.data_file.is_relative() {
                config.data_file = base.join(&config.data_file);
            }
            for dict in &mut config.dictionaries {
                if dict.is_relative() {
                    *dict = base.join(&*dict);
                }
            }
        }
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("tragax"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(
    name: &str,
    config: &ProviderConfig,
    timeout_secs: u64,
) -> Result<Arc<dyn TranslationProvider>> {
    let timeout = Some(timeout_secs);
    let provider: Arc<dyn TranslationProvider> = match config {
        ProviderConfig::Google { api_key, base_url } => Arc::new(
            GoogleProvider::new(api_key, base_url.clone(), timeout)
                .with_context(|| format!("failed to create provider {name}"))?,
        ),
        ProviderConfig::Libre { api_key, base_url } => Arc::new(
            LibreProvider::new(api_key.clone(), base_url.clone(), timeout)
                .with_context(|| format!("failed to create provider {name}"))?,
        ),
        ProviderConfig::MyMemory { email, base_url } => Arc::new(
            MyMemoryProvider::new(email.clone(), base_url.clone(), timeout)
                .with_context(|| format!("failed to create provider {name}"))?,
        ),
        ProviderConfig::Mock {
            responses,
            default_response,
            fail,
        } => {
            let mock = if *fail {
                MockProvider::failing("configured to fail")
            } else {
                let mock = MockProvider::new(responses.clone());
                match default_response {
                    Some(default) => mock.with_default(default),
                    None => mock,
                }
            };
            Arc::new(mock.named(name))
        }
    };
    Ok(provider)
}

/// Build the provider chain in priority order.
pub fn build_chain(config: &TragaxConfig) -> Result<Vec<Arc<dyn TranslationProvider>>> {
    let mut names: Vec<&str> = Vec::new();
    for name in &config.provider_order {
        if config.providers.contains_key(name) {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        } else {
            tracing::debug!("provider '{name}' listed in provider_order but not configured");
        }
    }
    let mut rest: Vec<&str> = config
        .providers
        .keys()
        .map(String::as_str)
        .filter(|n| !names.contains(n))
        .collect();
    rest.sort_unstable();
    names.extend(rest);

    names
        .into_iter()
        .filter_map(|name| config.providers.get(name).map(|p| (name, p)))
        .map(|(name, p)| create_provider(name, p, config.provider_timeout_secs))
        .collect()
}

/// The bundled dictionary plus every configured pack.
pub fn load_dictionary(config: &TragaxConfig) -> Result<Dictionary> {
    let mut dictionary = Dictionary::bundled();
    for path in &config.dictionaries {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dictionary: {}", path.display()))?;
        let pack = DictionaryPack::from_json(&content)
            .with_context(|| format!("failed to parse dictionary: {}", path.display()))?;
        tracing::debug!(
            "loaded {} entries for {}->{} from {}",
            pack.entries.len(),
            pack.from,
            pack.to,
            path.display()
        );
        dictionary.add_pack(pack);
    }
    Ok(dictionary)
}

/// A resolver wired from the configuration.
pub fn build_resolver(config: &TragaxConfig) -> Result<Resolver> {
    let cache = Arc::new(TranslationCache::with_capacity(config.cache_capacity));
    Ok(Resolver::new(cache, load_dictionary(config)?)
        .with_providers(build_chain(config)?)
        .with_config(config.resolver_config()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_TRAGAX_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_TRAGAX_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_TRAGAX_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_TRAGAX_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = TragaxConfig::default();
        assert_eq!(config.default_source_language, "en");
        assert_eq!(config.default_target_language, "fr");
        assert_eq!(config.provider_timeout_secs, 10);
        assert_eq!(config.batch_concurrency, 1);
        assert!(config.providers.is_empty());
        assert!(config.offline_fallback);
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
provider_order = ["mymemory", "google"]
default_target_language = "es"
provider_timeout_secs = 3

[providers.google]
type = "google"
api_key = "g-key"

[providers.libre]
type = "libre"
base_url = "http://localhost:5000"

[providers.mymemory]
type = "mymemory"
email = "me@example.com"
"#;
        let config: TragaxConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 3);
        assert!(matches!(
            config.providers.get("google"),
            Some(ProviderConfig::Google { .. })
        ));
        assert_eq!(config.default_target_language, "es");
        assert_eq!(config.resolver_config().provider_timeout, Duration::from_secs(3));
    }

    #[test]
    fn debug_masks_keys() {
        let config = ProviderConfig::Google {
            api_key: "super-secret".into(),
            base_url: None,
        };
        let shown = format!("{config:?}");
        assert!(!shown.contains("super-secret"));
        assert!(shown.contains("***"));
    }

    #[test]
    fn chain_follows_order_then_names() {
        let toml_str = r#"
provider_order = ["second", "missing", "first"]

[providers.first]
type = "mock"
default_response = "1"

[providers.second]
type = "mock"
default_response = "2"

[providers.zeta]
type = "mock"

[providers.alpha]
type = "mock"
"#;
        let config: TragaxConfig = toml::from_str(toml_str).unwrap();
        let chain = build_chain(&config).unwrap();
        let names: Vec<&str> = chain.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["second", "first", "alpha", "zeta"]);
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn relative_paths_follow_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tragax.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "data_file = \"store.json\"").unwrap();
        writeln!(file, "dictionaries = [\"packs/es.json\"]").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.data_file, dir.path().join("store.json"));
        assert_eq!(config.dictionaries[0], dir.path().join("packs/es.json"));
    }

    #[test]
    fn dictionary_packs_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let pack = dir.path().join("en-es.json");
        std::fs::write(
            &pack,
            r#"{
                "from": "en",
                "to": "es",
                "entries": [{"word": "dog", "translations": ["perro"]}]
            }"#,
        )
        .unwrap();
        let config = TragaxConfig {
            dictionaries: vec![pack],
            ..Default::default()
        };
        let dictionary = load_dictionary(&config).unwrap();
        assert_eq!(dictionary.lookup("dog", "en", "es"), Some("perro"));
        assert_eq!(dictionary.lookup("dog", "en", "fr"), Some("chien"));
    }

    #[tokio::test]
    async fn mock_keeps_responses_alongside_default() {
        let toml_str = r#"
[providers.scripted]
type = "mock"
responses = { "dog" = "chien" }
default_response = "inconnu"
"#;
        let config: TragaxConfig = toml::from_str(toml_str).unwrap();
        let provider = create_provider("scripted", &config.providers["scripted"], 1).unwrap();
        assert_eq!(provider.translate("dog", "en", "fr").await.unwrap(), "chien");
        assert_eq!(provider.translate("zzyzx", "en", "fr").await.unwrap(), "inconnu");
    }

    #[tokio::test]
    async fn resolver_uses_configured_chain() {
        let toml_str = r#"
[providers.broken]
type = "mock"
fail = true

[providers.scripted]
type = "mock"
responses = { "window" = "fenêtre" }
"#;
        let config: TragaxConfig = toml::from_str(toml_str).unwrap();
        let resolver = build_resolver(&config).unwrap();
        let t = resolver.resolve("Window", "en", "fr").await.unwrap();
        assert_eq!(t.text, "fenêtre");
        assert_eq!(
            t.origin,
            tragax_core::translate::Origin::Provider("scripted".into())
        );
    }
}
