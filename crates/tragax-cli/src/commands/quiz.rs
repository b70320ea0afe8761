//! The `tragax quiz` command.

use std::path::PathBuf;

use anyhow::{anyhow, Result};

use tragax_core::model::QuestionType;
use tragax_core::quiz::{Question, QuizConfig, QuizSession};

use super::{prompt, Workspace};

pub async fn execute(
    config_path: Option<PathBuf>,
    list: String,
    types: String,
    count: usize,
    exclude_learned: bool,
    in_order: bool,
) -> Result<()> {
    let types = parse_types(&types)?;
    let ws = Workspace::open(config_path.as_deref()).await?;
    let user = ws.current_user().await?;
    let list = ws.find_list(&user, &list).await?;

    let config = QuizConfig {
        types,
        count,
        include_learned: !exclude_learned,
        random_order: !in_order,
    };
    let mut session = QuizSession::start(ws.lists.clone(), &user.id, &list.id, config).await?;
    println!("Quiz on {} ({} questions)\n", list.name, session.len());

    while let Some(question) = session.current().cloned() {
        println!("[{}/{}]", session.current_index() + 1, session.len());
        let Some(line) = prompt(&ask(&question))? else {
            println!("Quiz abandoned, nothing recorded");
            return Ok(());
        };
        let response = resolve_choice(&question, &line);
        if session.answer(&response).await? {
            println!("  Correct!\n");
        } else {
            println!(
                "  Wrong: {} = {}\n",
                question.source_text, question.target_text
            );
        }
    }

    if let Some(result) = session.result() {
        println!(
            "Score: {}/{} ({:.0}%)",
            result.correct_answers,
            result.total_questions,
            result.score() * 100.0
        );
    }
    Ok(())
}

fn parse_types(raw: &str) -> Result<Vec<QuestionType>> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<QuestionType>().map_err(|e| anyhow!(e)))
        .collect()
}

fn ask(question: &Question) -> String {
    match question.question_type {
        QuestionType::TrueFalse => format!(
            "{} = {} ? [y/n] ",
            question.source_text,
            question.shown_text.as_deref().unwrap_or_default()
        ),
        QuestionType::MultipleChoice => {
            let mut text = format!("{}\n", question.source_text);
            for (i, option) in question.options.iter().enumerate() {
                text.push_str(&format!("  {}) {option}\n", i + 1));
            }
            text.push_str("Answer: ");
            text
        }
        QuestionType::Writing => format!("Translate: {}\n> ", question.source_text),
    }
}

/// Multiple-choice answers may be given by option number.
fn resolve_choice(question: &Question, line: &str) -> String {
    if question.question_type == QuestionType::MultipleChoice {
        if let Ok(n) = line.trim().parse::<usize>() {
            if let Some(option) = n.checked_sub(1).and_then(|i| question.options.get(i)) {
                return option.clone();
            }
        }
    }
    line.to_string()
}
