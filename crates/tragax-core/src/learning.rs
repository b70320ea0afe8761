//! Flashcard learning sessions.
//!
//! A session walks a fixed selection of a list's items. Each card can be
//! revealed, then left with an optional self-assessed [`Difficulty`] which
//! sets the item's learned flag through [`ListManager::set_learned`].

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::error::{VocabError, VocabResult};
use crate::lists::ListManager;
use crate::model::{Difficulty, TranslationItem, WordList};

/// Session setup.
#[derive(Debug, Clone)]
pub struct LearningConfig {
    /// Also review items already marked learned.
    pub include_learned: bool,
    pub random_order: bool,
    /// Maximum number of cards. Must be at least 1.
    pub count: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            include_learned: false,
            random_order: true,
            count: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningState {
    Active,
    Complete,
}

/// Where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LearningProgress {
    /// Cards already left.
    pub done: usize,
    pub total: usize,
    /// Items that became learned during this session.
    pub learned: usize,
}

/// Filter, optionally shuffle, then truncate `items` per `config`.
pub fn select_items<R: Rng + ?Sized>(
    items: Vec<TranslationItem>,
    config: &LearningConfig,
    rng: &mut R,
) -> VocabResult<Vec<TranslationItem>> {
    if config.count == 0 {
        return Err(VocabError::InvalidInput("card count must be at least 1".into()));
    }
    let mut selected: Vec<TranslationItem> = items
        .into_iter()
        .filter(|i| config.include_learned || !i.learned)
        .collect();
    if selected.is_empty() {
        return Err(VocabError::EmptySelection);
    }
    if config.random_order {
        selected.shuffle(rng);
    }
    selected.truncate(config.count);
    Ok(selected)
}

/// An in-progress flashcard session owned by its caller.
pub struct LearningSession {
    lists: ListManager,
    user_id: String,
    list: WordList,
    items: Vec<TranslationItem>,
    index: usize,
    revealed: bool,
    learned: usize,
}

impl LearningSession {
    pub async fn start(
        lists: ListManager,
        user_id: &str,
        list_id: &str,
        config: LearningConfig,
    ) -> VocabResult<Self> {
        let (list, items) = load(&lists, user_id, list_id, &config).await?;
        let items = select_items(items, &config, &mut rand::rng())?;
        Ok(Self::new(lists, user_id, list, items))
    }

    /// Like [`start`](Self::start) with a caller-provided RNG.
    pub async fn start_with_rng<R: Rng + ?Sized + Send>(
        lists: ListManager,
        user_id: &str,
        list_id: &str,
        config: LearningConfig,
        rng: &mut R,
    ) -> VocabResult<Self> {
        let (list, items) = load(&lists, user_id, list_id, &config).await?;
        let items = select_items(items, &config, rng)?;
        Ok(Self::new(lists, user_id, list, items))
    }

    fn new(lists: ListManager, user_id: &str, list: WordList, items: Vec<TranslationItem>) -> Self {
        tracing::debug!(list_id = %list.id, cards = items.len(), "learning session started");
        Self {
            lists,
            user_id: user_id.to_string(),
            list,
            items,
            index: 0,
            revealed: false,
            learned: 0,
        }
    }

    pub fn list(&self) -> &WordList {
        &self.list
    }

    /// The selected cards in review order, with their latest state.
    pub fn items(&self) -> &[TranslationItem] {
        &self.items
    }

    pub fn state(&self) -> LearningState {
        if self.index >= self.items.len() {
            LearningState::Complete
        } else {
            LearningState::Active
        }
    }

    /// The card under review, `None` once complete.
    pub fn current(&self) -> Option<&TranslationItem> {
        self.items.get(self.index)
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Show the translation of the current card. Idempotent.
    pub fn reveal(&mut self) -> VocabResult<&TranslationItem> {
        if self.state() == LearningState::Complete {
            return Err(VocabError::SessionClosed);
        }
        self.revealed = true;
        Ok(&self.items[self.index])
    }

    /// Leave the current card, recording `difficulty` if given.
    ///
    /// On a persistence failure the session stays on the same card.
    pub async fn advance(&mut self, difficulty: Option<Difficulty>) -> VocabResult<LearningState> {
        if self.state() == LearningState::Complete {
            return Err(VocabError::SessionClosed);
        }

        if let Some(difficulty) = difficulty {
            let current = &self.items[self.index];
            let was_learned = current.learned;
            let updated = self
                .lists
                .set_learned(
                    &self.user_id,
                    &current.id,
                    difficulty.marks_learned(),
                    Some(difficulty),
                )
                .await?;
            if updated.learned && !was_learned {
                self.learned += 1;
            }
            self.items[self.index] = updated;
        }

        self.index += 1;
        self.revealed = false;
        let state = self.state();
        if state == LearningState::Complete {
            tracing::debug!(
                list_id = %self.list.id,
                learned = self.learned,
                "learning session complete"
            );
        }
        Ok(state)
    }

    pub fn progress(&self) -> LearningProgress {
        LearningProgress {
            done: self.index.min(self.items.len()),
            total: self.items.len(),
            learned: self.learned,
        }
    }
}

async fn load(
    lists: &ListManager,
    user_id: &str,
    list_id: &str,
    config: &LearningConfig,
) -> VocabResult<(WordList, Vec<TranslationItem>)> {
    if config.count == 0 {
        return Err(VocabError::InvalidInput("card count must be at least 1".into()));
    }
    let user = lists.user(user_id).await?;
    let list = lists.owned_list(&user, list_id).await?;
    let items = lists.stored_items(list_id).await?;
    Ok((list, items))
}
