//! The `tragax register`, `login`, `logout` and `whoami` commands.

use std::path::PathBuf;

use anyhow::{bail, Result};

use super::Workspace;

pub async fn register(
    config_path: Option<PathBuf>,
    username: String,
    email: String,
    password: String,
) -> Result<()> {
    let ws = Workspace::open(config_path.as_deref()).await?;
    let user = ws.accounts.register(&username, &email, &password).await?;
    ws.start_session(&user)?;
    println!("Registered {} and logged in", user.username);
    Ok(())
}

pub async fn login(config_path: Option<PathBuf>, login: String, password: String) -> Result<()> {
    let ws = Workspace::open(config_path.as_deref()).await?;
    let Some(user) = ws.accounts.authenticate(&login, &password).await? else {
        bail!("invalid login or password");
    };
    ws.start_session(&user)?;
    println!("Logged in as {}", user.username);
    Ok(())
}

pub fn logout(config_path: Option<PathBuf>) -> Result<()> {
    if super::end_session(config_path.as_deref())? {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub async fn whoami(config_path: Option<PathBuf>) -> Result<()> {
    let ws = Workspace::open(config_path.as_deref()).await?;
    let user = ws.current_user().await?;
    println!("{} <{}>", user.username, user.email);
    println!(
        "  {} lists, member since {}",
        user.lists.len(),
        user.created_at.format("%Y-%m-%d")
    );
    Ok(())
}
