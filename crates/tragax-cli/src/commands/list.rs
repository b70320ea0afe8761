//! The `tragax list` subcommands.

use std::path::PathBuf;

use anyhow::{bail, Result};
use comfy_table::{Cell, Table};
use serde::Serialize;

use tragax_core::lists::{ListUpdate, NewItem, NewList};
use tragax_core::model::{TranslationItem, User, WordList};
use tragax_providers::build_resolver;

use super::Workspace;
use crate::ListCommand;

#[derive(Serialize)]
struct ListRow<'a> {
    #[serde(flatten)]
    list: &'a WordList,
    items: u32,
    learned: u32,
    progress: u32,
}

#[derive(Serialize)]
struct ListDetail<'a> {
    #[serde(flatten)]
    list: &'a WordList,
    items: &'a [TranslationItem],
}

pub async fn execute(config_path: Option<PathBuf>, command: ListCommand) -> Result<()> {
    let ws = Workspace::open(config_path.as_deref()).await?;
    let user = ws.current_user().await?;

    match command {
        ListCommand::Create {
            name,
            description,
            from,
            to,
        } => {
            let mut new = NewList::named(name).languages(
                from.unwrap_or_else(|| ws.config.default_source_language.clone()),
                to.unwrap_or_else(|| ws.config.default_target_language.clone()),
            );
            if let Some(description) = description {
                new = new.description(description);
            }
            let list = ws.lists.create_list(&user.id, new).await?;
            println!(
                "Created list {} ({} -> {}) [{}]",
                list.name, list.source_language, list.target_language, list.id
            );
        }
        ListCommand::Ls { json } => {
            let lists = ws.lists.lists_for_user(&user.id).await?;
            print_lists(&ws, &user.id, &lists, json).await?;
        }
        ListCommand::Search { query } => {
            let lists = ws.lists.search_lists(&user.id, &query).await?;
            print_lists(&ws, &user.id, &lists, false).await?;
        }
        ListCommand::Show { list, json } => {
            let list = ws.find_list(&user, &list).await?;
            let items = ws.lists.items_for_list(&user.id, &list.id).await?;
            if json {
                let detail = ListDetail {
                    list: &list,
                    items: &items,
                };
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print_items(&list, &items);
            }
        }
        ListCommand::Rename {
            list,
            name,
            description,
        } => {
            if name.is_none() && description.is_none() {
                bail!("nothing to change, pass --name or --description");
            }
            let list = ws.find_list(&user, &list).await?;
            let list = ws
                .lists
                .update_list(&user.id, &list.id, ListUpdate { name, description })
                .await?;
            println!("Updated list {}", list.name);
        }
        ListCommand::Delete { list } => {
            let list = ws.find_list(&user, &list).await?;
            ws.lists.delete_list(&user.id, &list.id).await?;
            println!("Deleted list {}", list.name);
        }
        ListCommand::Add {
            list,
            source,
            target,
        } => {
            let list = ws.find_list(&user, &list).await?;
            let new = match target {
                Some(target) => NewItem::new(source, target),
                None => {
                    let resolver = build_resolver(&ws.config)?;
                    resolver
                        .translate_item(&source, &list.source_language, &list.target_language)
                        .await?
                }
            };
            let item = ws.lists.add_item(&user.id, &list.id, new).await?;
            println!(
                "Added {} -> {} to {} [{}]",
                item.source_text, item.target_text, list.name, item.id
            );
        }
        ListCommand::Remove { list, item } => {
            let item = find_item(&ws, &user, &list, &item).await?;
            ws.lists.delete_item(&user.id, &item.id).await?;
            println!("Removed {}", item.source_text);
        }
        ListCommand::Learned { list, item } => {
            let item = find_item(&ws, &user, &list, &item).await?;
            let item = ws.lists.toggle_learned(&user.id, &item.id).await?;
            let state = if item.learned { "learned" } else { "not learned" };
            println!("{} is now {state}", item.source_text);
        }
    }
    Ok(())
}

/// An item of the list by id, or by source text ignoring case.
async fn find_item(ws: &Workspace, user: &User, list: &str, key: &str) -> Result<TranslationItem> {
    let list = ws.find_list(user, list).await?;
    let items = ws.lists.items_for_list(&user.id, &list.id).await?;
    items
        .iter()
        .find(|i| i.id == key)
        .or_else(|| {
            items
                .iter()
                .find(|i| i.source_text.to_lowercase() == key.trim().to_lowercase())
        })
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("no item {key:?} in list {}", list.name))
}

async fn print_lists(ws: &Workspace, user_id: &str, lists: &[WordList], json: bool) -> Result<()> {
    let mut rows = Vec::with_capacity(lists.len());
    for list in lists {
        let progress = ws.lists.list_progress(user_id, &list.id).await?;
        rows.push(ListRow {
            list,
            items: progress.total,
            learned: progress.learned,
            progress: progress.percent(),
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No lists. Create one with `tragax list create <name>`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Languages", "Items", "Learned", "Progress", "Id"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(&row.list.name),
            Cell::new(format!(
                "{} -> {}",
                row.list.source_language, row.list.target_language
            )),
            Cell::new(row.items),
            Cell::new(row.learned),
            Cell::new(format!("{}%", row.progress)),
            Cell::new(&row.list.id),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn print_items(list: &WordList, items: &[TranslationItem]) {
    println!(
        "{} ({} -> {})",
        list.name, list.source_language, list.target_language
    );
    if let Some(description) = &list.description {
        println!("{description}");
    }
    if items.is_empty() {
        println!("\nNo items yet.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Source", "Target", "Learned", "Difficulty", "Id"]);
    for item in items {
        table.add_row(vec![
            Cell::new(&item.source_text),
            Cell::new(&item.target_text),
            Cell::new(if item.learned { "yes" } else { "no" }),
            Cell::new(item.difficulty.map(|d| d.to_string()).unwrap_or_default()),
            Cell::new(&item.id),
        ]);
    }
    println!("{table}");
}
