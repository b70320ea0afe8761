//! Learning statistics: activity streaks, list progress and quiz aggregates.
//!
//! Everything here is pure. [`crate::lists::ListManager`] applies these to
//! stored records inside its write batches.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{QuestionType, TestResult, TranslationItem, UserStats};

/// Record one learning or quiz activity at `now`.
///
/// Same calendar day (UTC) leaves the streak alone, the next day extends it,
/// any longer gap restarts it at 1. An activity dated before the last one
/// is ignored for streak purposes.
pub fn record_activity(stats: &mut UserStats, now: DateTime<Utc>) {
    match stats.last_activity {
        None => stats.streak_days = 1,
        Some(last) => {
            let gap = (now.date_naive() - last.date_naive()).num_days();
            match gap {
                d if d < 0 => return,
                0 => stats.streak_days = stats.streak_days.max(1),
                1 => stats.streak_days += 1,
                _ => stats.streak_days = 1,
            }
        }
    }
    stats.last_activity = Some(now);
}

/// Learned and total item counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub learned: u32,
    pub total: u32,
}

impl Progress {
    pub fn of(items: &[TranslationItem]) -> Self {
        Self {
            learned: items.iter().filter(|i| i.learned).count() as u32,
            total: items.len() as u32,
        }
    }

    /// Learned share in percent, 0 for an empty list.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            (self.learned as f64 * 100.0 / self.total as f64).round() as u32
        }
    }
}

/// Per question type accuracy across many results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummary {
    pub question_type: QuestionType,
    pub questions: u32,
    pub correct: u32,
}

impl TypeSummary {
    pub fn accuracy(&self) -> f64 {
        if self.questions == 0 {
            0.0
        } else {
            self.correct as f64 / self.questions as f64
        }
    }
}

/// Aggregate over a set of quiz results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSummary {
    pub tests: u32,
    pub questions: u32,
    pub correct: u32,
    pub average_score: f64,
    pub best_score: f64,
    pub by_type: Vec<TypeSummary>,
}

/// Summarize quiz results. `by_type` follows first appearance order.
pub fn summarize_results(results: &[TestResult]) -> ResultSummary {
    if results.is_empty() {
        return ResultSummary::default();
    }

    let mut summary = ResultSummary {
        tests: results.len() as u32,
        ..Default::default()
    };
    let mut score_sum = 0.0;

    for result in results {
        summary.questions += result.total_questions;
        summary.correct += result.correct_answers;
        let score = result.score();
        score_sum += score;
        summary.best_score = summary.best_score.max(score);

        for outcome in &result.item_results {
            let pos = summary
                .by_type
                .iter()
                .position(|t| t.question_type == outcome.question_type)
                .unwrap_or_else(|| {
                    summary.by_type.push(TypeSummary {
                        question_type: outcome.question_type,
                        questions: 0,
                        correct: 0,
                    });
                    summary.by_type.len() - 1
                });
            let entry = &mut summary.by_type[pos];
            entry.questions += 1;
            if outcome.correct {
                entry.correct += 1;
            }
        }
    }

    summary.average_score = score_sum / results.len() as f64;
    summary
}
