//! Word lists and their items.
//!
//! Every mutation that touches a counter on the owning [`User`] commits the
//! record change and the counter change in one [`WriteBatch`]. A failed
//! commit leaves both untouched.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::error::{VocabError, VocabResult};
use crate::model::{
    new_id, Difficulty, TestResult, TranslationItem, User, UserStats, WordList,
    DEFAULT_SOURCE_LANGUAGE, DEFAULT_TARGET_LANGUAGE,
};
use crate::statistics::{self, Progress};
use crate::store::{RecordKind, Store, StoreExt, WriteBatch};

/// Input for [`ListManager::create_list`].
#[derive(Debug, Clone, Default)]
pub struct NewList {
    pub name: String,
    pub description: Option<String>,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
}

impl NewList {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn languages(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.source_language = Some(from.into());
        self.target_language = Some(to.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Changes for [`ListManager::update_list`]. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ListUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// An item that has not been added to a list yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub source_text: String,
    pub target_text: String,
}

impl NewItem {
    pub fn new(source_text: impl Into<String>, target_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            target_text: target_text.into(),
        }
    }
}

/// CRUD over lists and items, keeping the owner's counters in step.
#[derive(Clone)]
pub struct ListManager {
    store: Arc<dyn Store>,
}

impl ListManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub(crate) async fn user(&self, user_id: &str) -> VocabResult<User> {
        self.store
            .fetch::<User>(user_id)
            .await?
            .ok_or_else(|| VocabError::not_found("user", user_id))
    }

    pub async fn user_stats(&self, user_id: &str) -> VocabResult<UserStats> {
        Ok(self.user(user_id).await?.stats)
    }

    pub async fn get_list(&self, list_id: &str) -> VocabResult<WordList> {
        self.store
            .fetch::<WordList>(list_id)
            .await?
            .ok_or_else(|| VocabError::not_found("list", list_id))
    }

    /// A list the user owns. Lists of other users are reported as missing.
    pub(crate) async fn owned_list(&self, user: &User, list_id: &str) -> VocabResult<WordList> {
        if !user.owns_list(list_id) {
            return Err(VocabError::not_found("list", list_id));
        }
        self.get_list(list_id).await
    }

    pub async fn get_item(&self, item_id: &str) -> VocabResult<TranslationItem> {
        self.store
            .fetch::<TranslationItem>(item_id)
            .await?
            .ok_or_else(|| VocabError::not_found("item", item_id))
    }

    async fn owned_item(&self, user: &User, item_id: &str) -> VocabResult<TranslationItem> {
        let item = self.get_item(item_id).await?;
        if !user.owns_list(&item.list_id) {
            return Err(VocabError::not_found("item", item_id));
        }
        Ok(item)
    }

    pub async fn create_list(&self, user_id: &str, new: NewList) -> VocabResult<WordList> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(VocabError::InvalidInput("list name is empty".into()));
        }
        let mut user = self.user(user_id).await?;

        let now = Utc::now();
        let description = new
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format!("List created on {}", now.format("%Y-%m-%d")));
        let list = WordList {
            id: new_id(),
            name: name.to_string(),
            description: Some(description),
            source_language: language_or(new.source_language, DEFAULT_SOURCE_LANGUAGE),
            target_language: language_or(new.target_language, DEFAULT_TARGET_LANGUAGE),
            created_at: now,
            last_modified: now,
        };
        user.lists.push(list.id.clone());

        let mut batch = WriteBatch::new();
        batch.put(&list)?.put(&user)?;
        self.store.commit(batch).await?;

        tracing::debug!(list_id = %list.id, "created list {:?}", list.name);
        Ok(list)
    }

    /// The user's lists in the order they were created.
    pub async fn lists_for_user(&self, user_id: &str) -> VocabResult<Vec<WordList>> {
        let user = self.user(user_id).await?;
        let mut lists = Vec::with_capacity(user.lists.len());
        for id in &user.lists {
            match self.store.fetch::<WordList>(id).await? {
                Some(list) => lists.push(list),
                None => tracing::warn!(list_id = %id, "user references a missing list"),
            }
        }
        Ok(lists)
    }

    /// Case-insensitive substring match on name or description.
    pub async fn search_lists(&self, user_id: &str, query: &str) -> VocabResult<Vec<WordList>> {
        let needle = query.trim().to_lowercase();
        let lists = self.lists_for_user(user_id).await?;
        if needle.is_empty() {
            return Ok(lists);
        }
        Ok(lists
            .into_iter()
            .filter(|l| {
                l.name.to_lowercase().contains(&needle)
                    || l.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect())
    }

    pub async fn update_list(
        &self,
        user_id: &str,
        list_id: &str,
        update: ListUpdate,
    ) -> VocabResult<WordList> {
        let user = self.user(user_id).await?;
        let mut list = self.owned_list(&user, list_id).await?;

        if let Some(name) = update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(VocabError::InvalidInput("list name is empty".into()));
            }
            list.name = name.to_string();
        }
        if let Some(description) = update.description {
            let description = description.trim();
            list.description = (!description.is_empty()).then(|| description.to_string());
        }
        list.last_modified = Utc::now();

        self.store.save(&list).await?;
        Ok(list)
    }

    /// Delete a list together with its items and quiz results.
    pub async fn delete_list(&self, user_id: &str, list_id: &str) -> VocabResult<()> {
        let mut user = self.user(user_id).await?;
        let list = self.owned_list(&user, list_id).await?;
        let items: Vec<TranslationItem> = self.store.fetch_by_list(list_id).await?;
        let results: Vec<TestResult> = self.store.fetch_by_list(list_id).await?;

        let learned = items.iter().filter(|i| i.learned).count() as u32;
        let correct: u32 = results.iter().map(|r| r.correct_answers).sum();
        let stats = &mut user.stats;
        stats.total_words = stats.total_words.saturating_sub(items.len() as u32);
        stats.learned_words = stats.learned_words.saturating_sub(learned);
        stats.tests_taken = stats.tests_taken.saturating_sub(results.len() as u32);
        stats.correct_answers = stats.correct_answers.saturating_sub(correct);
        user.lists.retain(|id| id != list_id);

        let mut batch = WriteBatch::new();
        for item in &items {
            batch.delete(RecordKind::Item, &item.id);
        }
        for result in &results {
            batch.delete(RecordKind::TestResult, &result.id);
        }
        batch.delete(RecordKind::List, &list.id);
        batch.put(&user)?;
        self.store.commit(batch).await?;

        tracing::debug!(
            list_id,
            items = items.len(),
            results = results.len(),
            "deleted list"
        );
        Ok(())
    }

    pub async fn add_item(
        &self,
        user_id: &str,
        list_id: &str,
        new: NewItem,
    ) -> VocabResult<TranslationItem> {
        let source_text = new.source_text.trim();
        let target_text = new.target_text.trim();
        if source_text.is_empty() || target_text.is_empty() {
            return Err(VocabError::InvalidInput(
                "source and target text are required".into(),
            ));
        }
        let mut user = self.user(user_id).await?;
        let mut list = self.owned_list(&user, list_id).await?;

        let now = Utc::now();
        let item = TranslationItem {
            id: new_id(),
            list_id: list.id.clone(),
            source_text: source_text.to_string(),
            target_text: target_text.to_string(),
            source_language: list.source_language.clone(),
            target_language: list.target_language.clone(),
            created_at: now,
            last_reviewed: None,
            difficulty: None,
            learned: false,
        };
        list.last_modified = now;
        user.stats.total_words += 1;

        let mut batch = WriteBatch::new();
        batch.put(&item)?.put(&list)?.put(&user)?;
        self.store.commit(batch).await?;
        Ok(item)
    }

    pub async fn delete_item(&self, user_id: &str, item_id: &str) -> VocabResult<()> {
        let mut user = self.user(user_id).await?;
        let item = self.owned_item(&user, item_id).await?;

        user.stats.total_words = user.stats.total_words.saturating_sub(1);
        if item.learned {
            user.stats.learned_words = user.stats.learned_words.saturating_sub(1);
        }

        let mut batch = WriteBatch::new();
        batch.delete(RecordKind::Item, &item.id);
        if let Some(mut list) = self.store.fetch::<WordList>(&item.list_id).await? {
            list.last_modified = Utc::now();
            batch.put(&list)?;
        }
        batch.put(&user)?;
        self.store.commit(batch).await?;
        Ok(())
    }

    /// Set an item's learned flag.
    ///
    /// This is the only path that changes `learned`. The counter moves only
    /// when the flag actually flips. `last_reviewed` is always stamped and a
    /// given difficulty is recorded.
    pub async fn set_learned(
        &self,
        user_id: &str,
        item_id: &str,
        learned: bool,
        difficulty: Option<Difficulty>,
    ) -> VocabResult<TranslationItem> {
        let mut user = self.user(user_id).await?;
        let mut item = self.owned_item(&user, item_id).await?;

        let now = Utc::now();
        apply_learned(&mut item, &mut user.stats, learned);
        if difficulty.is_some() {
            item.difficulty = difficulty;
        }
        item.last_reviewed = Some(now);
        statistics::record_activity(&mut user.stats, now);

        let mut batch = WriteBatch::new();
        batch.put(&item)?.put(&user)?;
        self.store.commit(batch).await?;
        Ok(item)
    }

    pub async fn toggle_learned(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> VocabResult<TranslationItem> {
        let item = self.get_item(item_id).await?;
        self.set_learned(user_id, item_id, !item.learned, None).await
    }

    /// Items of one of the user's lists, in insertion order.
    pub async fn items_for_list(
        &self,
        user_id: &str,
        list_id: &str,
    ) -> VocabResult<Vec<TranslationItem>> {
        let user = self.user(user_id).await?;
        self.owned_list(&user, list_id).await?;
        self.stored_items(list_id).await
    }

    /// Items of a list whose ownership the caller already checked.
    pub(crate) async fn stored_items(&self, list_id: &str) -> VocabResult<Vec<TranslationItem>> {
        Ok(self.store.fetch_by_list(list_id).await?)
    }

    /// Quiz results for one of the user's lists, newest first.
    pub async fn results_for_list(
        &self,
        user_id: &str,
        list_id: &str,
    ) -> VocabResult<Vec<TestResult>> {
        let user = self.user(user_id).await?;
        self.owned_list(&user, list_id).await?;
        let mut results: Vec<TestResult> = self.store.fetch_by_list(list_id).await?;
        results.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(results)
    }

    /// Persist a finished quiz.
    ///
    /// Stores the result, bumps the test counters and marks each item in
    /// `correct_items` learned, all in one batch.
    pub async fn record_test_result(
        &self,
        user_id: &str,
        result: &TestResult,
        correct_items: &[String],
    ) -> VocabResult<()> {
        let mut user = self.user(user_id).await?;
        if !user.owns_list(&result.list_id) {
            return Err(VocabError::not_found("list", &result.list_id));
        }

        let now = Utc::now();
        let mut batch = WriteBatch::new();
        batch.put(result)?;

        let mut seen = HashSet::new();
        for item_id in correct_items {
            if !seen.insert(item_id.as_str()) {
                continue;
            }
            let Some(mut item) = self.store.fetch::<TranslationItem>(item_id).await? else {
                tracing::warn!(item_id = %item_id, "quiz item vanished before recording");
                continue;
            };
            if item.list_id != result.list_id {
                continue;
            }
            apply_learned(&mut item, &mut user.stats, true);
            item.last_reviewed = Some(now);
            batch.put(&item)?;
        }

        user.stats.tests_taken += 1;
        user.stats.correct_answers += result.correct_answers;
        statistics::record_activity(&mut user.stats, now);
        batch.put(&user)?;

        self.store.commit(batch).await?;
        Ok(())
    }

    /// Rebuild the user's counters from the stored items and results.
    ///
    /// Streak fields are kept. The recomputed stats are saved only when they
    /// differ from the stored ones.
    pub async fn recompute_stats(&self, user_id: &str) -> VocabResult<UserStats> {
        let mut user = self.user(user_id).await?;
        let mut stats = UserStats {
            streak_days: user.stats.streak_days,
            last_activity: user.stats.last_activity,
            ..Default::default()
        };

        for list_id in &user.lists {
            let items: Vec<TranslationItem> = self.store.fetch_by_list(list_id).await?;
            let progress = Progress::of(&items);
            stats.total_words += progress.total;
            stats.learned_words += progress.learned;

            let results: Vec<TestResult> = self.store.fetch_by_list(list_id).await?;
            stats.tests_taken += results.len() as u32;
            stats.correct_answers += results.iter().map(|r| r.correct_answers).sum::<u32>();
        }

        if stats != user.stats {
            tracing::info!(
                user_id,
                "reconciled stats: words {} -> {}, learned {} -> {}",
                user.stats.total_words,
                stats.total_words,
                user.stats.learned_words,
                stats.learned_words
            );
            user.stats = stats.clone();
            self.store.save(&user).await?;
        }
        Ok(stats)
    }

    pub async fn list_progress(&self, user_id: &str, list_id: &str) -> VocabResult<Progress> {
        let items = self.items_for_list(user_id, list_id).await?;
        Ok(Progress::of(&items))
    }
}

fn language_or(code: Option<String>, default: &str) -> String {
    code.map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn apply_learned(item: &mut TranslationItem, stats: &mut UserStats, learned: bool) {
    if item.learned == learned {
        return;
    }
    item.learned = learned;
    if learned {
        stats.learned_words += 1;
    } else {
        stats.learned_words = stats.learned_words.saturating_sub(1);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{ItemOutcome, QuestionType};
    use crate::store::MemoryStore;

    /// A manager over an in-memory store with one registered user.
    pub(crate) async fn fixture() -> (ListManager, Arc<MemoryStore>, String) {
        let store = Arc::new(MemoryStore::new());
        let user = User {
            id: "u1".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            password_hash: "x".into(),
            created_at: Utc::now(),
            lists: vec![],
            stats: UserStats::default(),
        };
        store.save(&user).await.unwrap();
        (ListManager::new(store.clone()), store, user.id)
    }

    async fn learned_in_store(manager: &ListManager, list_id: &str) -> u32 {
        Progress::of(&manager.stored_items(list_id).await.unwrap()).learned
    }

    #[tokio::test]
    async fn create_list_defaults() {
        let (manager, _, user) = fixture().await;
        let list = manager
            .create_list(&user, NewList::named("  Animals "))
            .await
            .unwrap();
        assert_eq!(list.name, "Animals");
        assert_eq!(list.source_language, "en");
        assert_eq!(list.target_language, "fr");
        assert!(list.description.unwrap().starts_with("List created on "));

        let lists = manager.lists_for_user(&user).await.unwrap();
        assert_eq!(lists.len(), 1);
    }

    #[tokio::test]
    async fn create_list_rejects_blank_name() {
        let (manager, _, user) = fixture().await;
        let err = manager
            .create_list(&user, NewList::named("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, VocabError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (manager, _, _) = fixture().await;
        let err = manager
            .create_list("ghost", NewList::named("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, VocabError::NotFound { kind: "user", .. }));
    }

    #[tokio::test]
    async fn counters_track_item_sets() {
        let (manager, _, user) = fixture().await;
        let list = manager
            .create_list(&user, NewList::named("Basics"))
            .await
            .unwrap();

        let mut ids = Vec::new();
        for (s, t) in [("dog", "chien"), ("cat", "chat"), ("house", "maison")] {
            ids.push(
                manager
                    .add_item(&user, &list.id, NewItem::new(s, t))
                    .await
                    .unwrap()
                    .id,
            );
        }

        manager.set_learned(&user, &ids[0], true, None).await.unwrap();
        manager.set_learned(&user, &ids[0], true, None).await.unwrap();
        manager.toggle_learned(&user, &ids[1]).await.unwrap();
        manager.toggle_learned(&user, &ids[1]).await.unwrap();
        manager.set_learned(&user, &ids[2], true, None).await.unwrap();
        manager.delete_item(&user, &ids[2]).await.unwrap();

        let stats = manager.user_stats(&user).await.unwrap();
        assert_eq!(stats.total_words, 2);
        assert_eq!(stats.learned_words, 1);
        assert_eq!(stats.learned_words, learned_in_store(&manager, &list.id).await);
    }

    #[tokio::test]
    async fn set_learned_stamps_review_and_difficulty() {
        let (manager, _, user) = fixture().await;
        let list = manager
            .create_list(&user, NewList::named("L"))
            .await
            .unwrap();
        let item = manager
            .add_item(&user, &list.id, NewItem::new("yes", "oui"))
            .await
            .unwrap();
        assert!(item.last_reviewed.is_none());

        let item = manager
            .set_learned(&user, &item.id, false, Some(Difficulty::Hard))
            .await
            .unwrap();
        assert!(!item.learned);
        assert_eq!(item.difficulty, Some(Difficulty::Hard));
        assert!(item.last_reviewed.is_some());

        let stats = manager.user_stats(&user).await.unwrap();
        assert_eq!(stats.learned_words, 0);
        assert_eq!(stats.streak_days, 1);
    }

    #[tokio::test]
    async fn add_item_requires_both_texts() {
        let (manager, _, user) = fixture().await;
        let list = manager
            .create_list(&user, NewList::named("L"))
            .await
            .unwrap();
        let err = manager
            .add_item(&user, &list.id, NewItem::new("dog", "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, VocabError::InvalidInput(_)));
        assert_eq!(manager.user_stats(&user).await.unwrap().total_words, 0);
    }

    #[tokio::test]
    async fn failed_commit_leaves_counters_alone() {
        let (manager, store, user) = fixture().await;
        let list = manager
            .create_list(&user, NewList::named("L"))
            .await
            .unwrap();
        let item = manager
            .add_item(&user, &list.id, NewItem::new("dog", "chien"))
            .await
            .unwrap();

        store.set_read_only(true);
        let err = manager
            .set_learned(&user, &item.id, true, None)
            .await
            .unwrap_err();
        assert!(matches!(err, VocabError::PersistenceFailure(_)));
        store.set_read_only(false);

        assert!(!manager.get_item(&item.id).await.unwrap().learned);
        assert_eq!(manager.user_stats(&user).await.unwrap().learned_words, 0);
    }

    #[tokio::test]
    async fn delete_list_cascades() {
        let (manager, store, user) = fixture().await;
        let keep = manager
            .create_list(&user, NewList::named("Keep"))
            .await
            .unwrap();
        let gone = manager
            .create_list(&user, NewList::named("Drop"))
            .await
            .unwrap();
        manager
            .add_item(&user, &keep.id, NewItem::new("a", "b"))
            .await
            .unwrap();
        let doomed = manager
            .add_item(&user, &gone.id, NewItem::new("c", "d"))
            .await
            .unwrap();
        manager.set_learned(&user, &doomed.id, true, None).await.unwrap();

        let result = TestResult {
            id: "r1".into(),
            list_id: gone.id.clone(),
            test_type: QuestionType::Writing,
            date: Utc::now(),
            total_questions: 1,
            correct_answers: 1,
            item_results: vec![ItemOutcome {
                item_id: doomed.id.clone(),
                correct: true,
                question_type: QuestionType::Writing,
            }],
        };
        manager
            .record_test_result(&user, &result, &[doomed.id.clone()])
            .await
            .unwrap();

        manager.delete_list(&user, &gone.id).await.unwrap();

        assert_eq!(store.count(RecordKind::Item).await, 1);
        assert_eq!(store.count(RecordKind::TestResult).await, 0);
        assert!(matches!(
            manager.get_list(&gone.id).await,
            Err(VocabError::NotFound { .. })
        ));
        let stats = manager.user_stats(&user).await.unwrap();
        assert_eq!(stats.total_words, 1);
        assert_eq!(stats.learned_words, 0);
        assert_eq!(stats.tests_taken, 0);
        assert_eq!(stats.correct_answers, 0);
        assert_eq!(manager.lists_for_user(&user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_list_matches_recompute() {
        let (manager, _, user) = fixture().await;
        let keep = manager
            .create_list(&user, NewList::named("Keep"))
            .await
            .unwrap();
        let gone = manager
            .create_list(&user, NewList::named("Drop"))
            .await
            .unwrap();
        for list in [&keep, &gone] {
            let item = manager
                .add_item(&user, &list.id, NewItem::new("dog", "chien"))
                .await
                .unwrap();
            let result = TestResult {
                id: format!("r-{}", list.id),
                list_id: list.id.clone(),
                test_type: QuestionType::Writing,
                date: Utc::now(),
                total_questions: 2,
                correct_answers: 1,
                item_results: vec![],
            };
            manager
                .record_test_result(&user, &result, &[item.id])
                .await
                .unwrap();
        }

        manager.delete_list(&user, &gone.id).await.unwrap();

        let incremental = manager.user_stats(&user).await.unwrap();
        assert_eq!(incremental.tests_taken, 1);
        assert_eq!(incremental.correct_answers, 1);
        let recomputed = manager.recompute_stats(&user).await.unwrap();
        assert_eq!(incremental, recomputed);
    }

    #[tokio::test]
    async fn other_users_lists_are_hidden() {
        let (manager, store, user) = fixture().await;
        let list = manager
            .create_list(&user, NewList::named("Mine"))
            .await
            .unwrap();
        let intruder = User {
            id: "u2".into(),
            username: "eve".into(),
            email: "eve@example.com".into(),
            password_hash: "x".into(),
            created_at: Utc::now(),
            lists: vec![],
            stats: UserStats::default(),
        };
        store.save(&intruder).await.unwrap();

        let err = manager
            .add_item("u2", &list.id, NewItem::new("a", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, VocabError::NotFound { kind: "list", .. }));
        assert!(manager.delete_list("u2", &list.id).await.is_err());
        assert!(matches!(
            manager.items_for_list("u2", &list.id).await,
            Err(VocabError::NotFound { kind: "list", .. })
        ));
        assert!(manager.results_for_list("u2", &list.id).await.is_err());
        assert!(manager.list_progress("u2", &list.id).await.is_err());
        assert!(manager.items_for_list(&user, &list.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_and_rename() {
        let (manager, _, user) = fixture().await;
        let food = manager
            .create_list(&user, NewList::named("Food").description("Kitchen words"))
            .await
            .unwrap();
        manager
            .create_list(&user, NewList::named("Travel"))
            .await
            .unwrap();

        let hits = manager.search_lists(&user, "KITCHEN").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, food.id);

        let renamed = manager
            .update_list(
                &user,
                &food.id,
                ListUpdate {
                    name: Some("Cooking".into()),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Cooking");
        assert_eq!(renamed.description.as_deref(), Some("Kitchen words"));
        assert_eq!(manager.search_lists(&user, "cook").await.unwrap().len(), 1);
        assert_eq!(manager.search_lists(&user, "").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn recompute_repairs_drift() {
        let (manager, store, user) = fixture().await;
        let list = manager
            .create_list(&user, NewList::named("L"))
            .await
            .unwrap();
        let item = manager
            .add_item(&user, &list.id, NewItem::new("dog", "chien"))
            .await
            .unwrap();
        manager.set_learned(&user, &item.id, true, None).await.unwrap();

        let mut broken: User = store.fetch("u1").await.unwrap().unwrap();
        broken.stats.total_words = 40;
        broken.stats.learned_words = 7;
        store.save(&broken).await.unwrap();

        let stats = manager.recompute_stats(&user).await.unwrap();
        assert_eq!(stats.total_words, 1);
        assert_eq!(stats.learned_words, 1);
        assert_eq!(stats.streak_days, 1);
        assert_eq!(manager.user_stats(&user).await.unwrap(), stats);
    }

    #[tokio::test]
    async fn record_result_marks_items_once() {
        let (manager, _, user) = fixture().await;
        let list = manager
            .create_list(&user, NewList::named("L"))
            .await
            .unwrap();
        let a = manager
            .add_item(&user, &list.id, NewItem::new("dog", "chien"))
            .await
            .unwrap();
        let b = manager
            .add_item(&user, &list.id, NewItem::new("cat", "chat"))
            .await
            .unwrap();
        manager.set_learned(&user, &b.id, true, None).await.unwrap();

        let result = TestResult {
            id: "r1".into(),
            list_id: list.id.clone(),
            test_type: QuestionType::MultipleChoice,
            date: Utc::now(),
            total_questions: 3,
            correct_answers: 3,
            item_results: vec![],
        };
        let correct = vec![a.id.clone(), a.id.clone(), b.id.clone()];
        manager
            .record_test_result(&user, &result, &correct)
            .await
            .unwrap();

        let stats = manager.user_stats(&user).await.unwrap();
        assert_eq!(stats.learned_words, 2);
        assert_eq!(stats.tests_taken, 1);
        assert_eq!(stats.correct_answers, 3);
        assert_eq!(manager.results_for_list(&user, &list.id).await.unwrap().len(), 1);
        assert_eq!(manager.list_progress(&user, &list.id).await.unwrap().percent(), 100);
    }
}
