//! The `tragax translate` command.

use std::path::PathBuf;

use anyhow::Result;

use tragax_core::translate::{BatchEntry, Origin};
use tragax_providers::{build_resolver, load_config_from};

pub async fn execute(
    config_path: Option<PathBuf>,
    texts: Vec<String>,
    from: Option<String>,
    to: Option<String>,
    json: bool,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let from = from.unwrap_or_else(|| config.default_source_language.clone());
    let to = to.unwrap_or_else(|| config.default_target_language.clone());
    let resolver = build_resolver(&config)?;
    tracing::debug!(providers = ?resolver.provider_names(), "translating {} texts", texts.len());

    let entries = resolver.resolve_many(&texts, &from, &to).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            match entry {
                BatchEntry::Translated {
                    source,
                    translation,
                } => println!(
                    "{source} -> {} ({})",
                    translation.text,
                    origin_label(&translation.origin)
                ),
                BatchEntry::Failed { source, error } => println!("{source} -> FAILED: {error}"),
            }
        }
    }

    let failed = entries.iter().filter(|e| e.is_failed()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} translations failed", entries.len());
    }
    Ok(())
}

pub fn origin_label(origin: &Origin) -> String {
    match origin {
        Origin::Cache => "cache".into(),
        Origin::Dictionary => "dictionary".into(),
        Origin::Provider(name) => name.clone(),
        Origin::Offline => "offline".into(),
    }
}
