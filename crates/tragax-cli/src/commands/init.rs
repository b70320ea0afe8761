//! The `tragax init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("tragax.toml").exists() {
        println!("tragax.toml already exists, skipping.");
    } else {
        std::fs::write("tragax.toml", SAMPLE_CONFIG)?;
        println!("Created tragax.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit tragax.toml to enable the translation services you use");
    println!("  2. Run: tragax register <username> <email> --password <password>");
    println!("  3. Run: tragax list create \"My first list\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# tragax configuration

default_source_language = "en"
default_target_language = "fr"
provider_order = ["google", "libre", "mymemory"]
provider_timeout_secs = 10
batch_concurrency = 1
batch_delay_ms = 100
offline_fallback = true
data_file = "tragax-data.json"
# dictionaries = ["dictionaries/en-es.json"]

# [providers.google]
# type = "google"
# api_key = "${GOOGLE_TRANSLATE_KEY}"

[providers.libre]
type = "libre"
base_url = "https://libretranslate.de"

[providers.mymemory]
type = "mymemory"
# email = "you@example.com"
"#;
