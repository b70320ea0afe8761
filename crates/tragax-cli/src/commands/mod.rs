pub mod account;
pub mod init;
pub mod learn;
pub mod list;
pub mod quiz;
pub mod stats;
pub mod translate;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use tragax_core::accounts::Accounts;
use tragax_core::lists::ListManager;
use tragax_core::model::{User, WordList};
use tragax_core::store::JsonFileStore;
use tragax_providers::{load_config_from, TragaxConfig};

/// Everything a command needs: configuration and the opened data file.
pub struct Workspace {
    pub config: TragaxConfig,
    pub accounts: Accounts,
    pub lists: ListManager,
    session_file: PathBuf,
}

impl Workspace {
    pub async fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let store = JsonFileStore::open(&config.data_file)
            .await
            .with_context(|| format!("failed to open data file: {}", config.data_file.display()))?;
        let store = Arc::new(store);
        Ok(Self {
            accounts: Accounts::new(store.clone()).with_cost(config.bcrypt_cost),
            lists: ListManager::new(store),
            session_file: session_file(&config),
            config,
        })
    }

    /// The logged-in user.
    pub async fn current_user(&self) -> Result<User> {
        let Some(user_id) = read_session(&self.session_file)? else {
            bail!("not logged in, run `tragax login` first");
        };
        self.accounts
            .get_user(&user_id)
            .await
            .context("session refers to an unknown user, log in again")
    }

    pub fn start_session(&self, user: &User) -> Result<()> {
        std::fs::write(&self.session_file, &user.id).with_context(|| {
            format!("failed to write session file: {}", self.session_file.display())
        })
    }

    /// Find one of the user's lists by id or by name, ignoring case.
    pub async fn find_list(&self, user: &User, key: &str) -> Result<WordList> {
        if user.owns_list(key) {
            return Ok(self.lists.get_list(key).await?);
        }
        let matches: Vec<WordList> = self
            .lists
            .lists_for_user(&user.id)
            .await?
            .into_iter()
            .filter(|l| l.name.eq_ignore_ascii_case(key))
            .collect();
        match matches.len() {
            0 => bail!("no list named {key:?}"),
            1 => Ok(matches.into_iter().next().context("list disappeared")?),
            n => bail!("{n} lists are named {key:?}, use the list id"),
        }
    }
}

/// The session file sits next to the data file.
fn session_file(config: &TragaxConfig) -> PathBuf {
    config.data_file.with_extension("session")
}

fn read_session(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let id = content.trim();
            Ok((!id.is_empty()).then(|| id.to_string()))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => {
            Err(e).with_context(|| format!("failed to read session file: {}", path.display()))
        }
    }
}

pub fn end_session(config_path: Option<&Path>) -> Result<bool> {
    let config = load_config_from(config_path)?;
    let path = session_file(&config);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => {
            Err(e).with_context(|| format!("failed to remove session file: {}", path.display()))
        }
    }
}

/// Prompt and read one line from stdin. `None` at end of input.
pub fn prompt(message: &str) -> Result<Option<String>> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
