//! The `tragax stats` and `tragax results` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use serde::Serialize;

use tragax_core::model::{TestResult, UserStats};
use tragax_core::statistics::{summarize_results, ResultSummary};

use super::Workspace;

#[derive(Serialize)]
struct StatsReport<'a> {
    stats: &'a UserStats,
    results: &'a ResultSummary,
}

pub async fn execute(config_path: Option<PathBuf>, recompute: bool, json: bool) -> Result<()> {
    let ws = Workspace::open(config_path.as_deref()).await?;
    let user = ws.current_user().await?;
    let stats = if recompute {
        ws.lists.recompute_stats(&user.id).await?
    } else {
        user.stats.clone()
    };

    let mut results: Vec<TestResult> = Vec::new();
    for list in ws.lists.lists_for_user(&user.id).await? {
        results.extend(ws.lists.results_for_list(&user.id, &list.id).await?);
    }
    let summary = summarize_results(&results);

    if json {
        let report = StatsReport {
            stats: &stats,
            results: &summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Statistics for {}\n", user.username);
    let mut table = Table::new();
    table.set_header(vec!["Words", "Learned", "Tests", "Correct answers", "Streak"]);
    table.add_row(vec![
        Cell::new(stats.total_words),
        Cell::new(stats.learned_words),
        Cell::new(stats.tests_taken),
        Cell::new(stats.correct_answers),
        Cell::new(format!("{} days", stats.streak_days)),
    ]);
    println!("{table}");

    if summary.tests > 0 {
        println!(
            "\nAverage score {:.1}%, best {:.1}% over {} quizzes",
            summary.average_score * 100.0,
            summary.best_score * 100.0,
            summary.tests
        );
        let mut by_type = Table::new();
        by_type.set_header(vec!["Type", "Questions", "Correct", "Accuracy"]);
        for t in &summary.by_type {
            by_type.add_row(vec![
                Cell::new(t.question_type),
                Cell::new(t.questions),
                Cell::new(t.correct),
                Cell::new(format!("{:.1}%", t.accuracy() * 100.0)),
            ]);
        }
        println!("{by_type}");
    }
    Ok(())
}

pub async fn results(config_path: Option<PathBuf>, list: String, json: bool) -> Result<()> {
    let ws = Workspace::open(config_path.as_deref()).await?;
    let user = ws.current_user().await?;
    let list = ws.find_list(&user, &list).await?;
    let results = ws.lists.results_for_list(&user.id, &list.id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("No quiz results for {} yet.", list.name);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Type", "Correct", "Score"]);
    for result in &results {
        table.add_row(vec![
            Cell::new(result.date.format("%Y-%m-%d %H:%M")),
            Cell::new(result.test_type),
            Cell::new(format!("{}/{}", result.correct_answers, result.total_questions)),
            Cell::new(format!("{:.1}%", result.score() * 100.0)),
        ]);
    }
    println!("{table}");
    Ok(())
}
