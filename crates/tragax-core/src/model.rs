//! Core data model types for tragax.
//!
//! Four record kinds are persisted: [`User`], [`WordList`],
//! [`TranslationItem`] and [`TestResult`]. Items and results point at their
//! list through `list_id`; lists are owned by users through `User::lists`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default source language for new lists and translations.
pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";
/// Default target language for new lists and translations.
pub const DEFAULT_TARGET_LANGUAGE: &str = "fr";

/// A supported language code with its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

/// Languages offered when creating lists.
pub const LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English" },
    Language { code: "fr", name: "French" },
    Language { code: "es", name: "Spanish" },
    Language { code: "de", name: "German" },
    Language { code: "it", name: "Italian" },
    Language { code: "pt", name: "Portuguese" },
    Language { code: "nl", name: "Dutch" },
    Language { code: "ru", name: "Russian" },
    Language { code: "ja", name: "Japanese" },
    Language { code: "zh", name: "Chinese" },
    Language { code: "ar", name: "Arabic" },
];

/// Look up a language by code, case-insensitively.
pub fn language(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code.eq_ignore_ascii_case(code))
}

/// An account together with its denormalized learning counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    /// Ids of the lists this user owns.
    #[serde(default)]
    pub lists: Vec<String>,
    #[serde(default)]
    pub stats: UserStats,
}

impl User {
    pub fn owns_list(&self, list_id: &str) -> bool {
        self.lists.iter().any(|id| id == list_id)
    }
}

/// Per-user counters. Maintained incrementally alongside every item change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_words: u32,
    pub learned_words: u32,
    pub tests_taken: u32,
    pub correct_answers: u32,
    pub streak_days: u32,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

/// A named collection of translation items for one language pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub source_language: String,
    pub target_language: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// A single source/target pair belonging to exactly one list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationItem {
    pub id: String,
    pub list_id: String,
    pub source_text: String,
    pub target_text: String,
    pub source_language: String,
    pub target_language: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_reviewed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub learned: bool,
}

/// Self-assessed difficulty reported while reviewing a flashcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Easy and medium count as learned, hard does not.
    pub fn marks_learned(self) -> bool {
        self != Difficulty::Hard
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" => Ok(Difficulty::Easy),
            "medium" | "m" => Ok(Difficulty::Medium),
            "hard" | "h" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Quiz question modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    TrueFalse,
    MultipleChoice,
    Writing,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::TrueFalse => write!(f, "truefalse"),
            QuestionType::MultipleChoice => write!(f, "multiplechoice"),
            QuestionType::Writing => write!(f, "writing"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "truefalse" | "true-false" | "tf" => Ok(QuestionType::TrueFalse),
            "multiplechoice" | "multiple-choice" | "mc" => Ok(QuestionType::MultipleChoice),
            "writing" | "write" | "w" => Ok(QuestionType::Writing),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// Outcome of one quiz question inside a [`TestResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcome {
    pub item_id: String,
    pub correct: bool,
    pub question_type: QuestionType,
}

/// The immutable record of a finished quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    pub list_id: String,
    /// First selected question type; mixed quizzes keep per-item types below.
    #[serde(rename = "type")]
    pub test_type: QuestionType,
    pub date: DateTime<Utc>,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub item_results: Vec<ItemOutcome>,
}

impl TestResult {
    /// Fraction of questions answered correctly, in `[0, 1]`.
    pub fn score(&self) -> f64 {
        if self.total_questions == 0 {
            0.0
        } else {
            self.correct_answers as f64 / self.total_questions as f64
        }
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
