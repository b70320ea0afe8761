//! The `tragax learn` command: an interactive flashcard review on stdin.

use std::path::PathBuf;

use anyhow::Result;

use tragax_core::learning::{LearningConfig, LearningSession};
use tragax_core::model::Difficulty;

use super::{prompt, Workspace};

pub async fn execute(
    config_path: Option<PathBuf>,
    list: String,
    count: usize,
    include_learned: bool,
    in_order: bool,
) -> Result<()> {
    let ws = Workspace::open(config_path.as_deref()).await?;
    let user = ws.current_user().await?;
    let list = ws.find_list(&user, &list).await?;

    let config = LearningConfig {
        include_learned,
        random_order: !in_order,
        count,
    };
    let mut session = LearningSession::start(ws.lists.clone(), &user.id, &list.id, config).await?;
    println!(
        "Learning {} ({} cards). Enter reveals, q quits.\n",
        list.name,
        session.items().len()
    );

    'cards: while let Some(card) = session.current() {
        let total = session.items().len();
        println!("[{}/{}] {}", session.current_index() + 1, total, card.source_text);

        match prompt("")? {
            Some(line) if !line.trim().eq_ignore_ascii_case("q") => {}
            _ => break,
        }
        let card = session.reveal()?;
        println!("  -> {}", card.target_text);

        loop {
            let Some(line) = prompt("How was it? [e]asy [m]edium [h]ard, Enter skips: ")? else {
                break 'cards;
            };
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                break 'cards;
            }
            let difficulty = if line.is_empty() {
                None
            } else {
                match line.parse::<Difficulty>() {
                    Ok(d) => Some(d),
                    Err(e) => {
                        println!("  {e}");
                        continue;
                    }
                }
            };
            session.advance(difficulty).await?;
            break;
        }
        println!();
    }

    let progress = session.progress();
    println!(
        "Reviewed {}/{} cards, {} newly learned",
        progress.done, progress.total, progress.learned
    );
    Ok(())
}
