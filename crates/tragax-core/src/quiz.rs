//! Quiz sessions: question generation, grading and result recording.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::Serialize;

use crate::error::{VocabError, VocabResult};
use crate::lists::ListManager;
use crate::model::{new_id, ItemOutcome, QuestionType, TestResult, TranslationItem, WordList};

/// Most options a multiple-choice question offers.
pub const MAX_OPTIONS: usize = 4;

/// Quiz setup.
#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// Question types, in the order their quotas are filled.
    pub types: Vec<QuestionType>,
    /// Requested number of questions. Capped at the pool size.
    pub count: usize,
    pub include_learned: bool,
    pub random_order: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            types: vec![QuestionType::MultipleChoice],
            count: 10,
            include_learned: true,
            random_order: true,
        }
    }
}

/// One generated question and, once answered, its grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub item_id: String,
    pub question_type: QuestionType,
    pub source_text: String,
    /// The item's genuine translation.
    pub target_text: String,
    /// Translation shown in a true/false question; may belong to another item.
    pub shown_text: Option<String>,
    /// Multiple-choice options. Empty for other types.
    pub options: Vec<String>,
    pub user_answer: Option<String>,
    pub is_correct: Option<bool>,
}

impl Question {
    fn new(item: &TranslationItem, question_type: QuestionType) -> Self {
        Self {
            item_id: item.id.clone(),
            question_type,
            source_text: item.source_text.clone(),
            target_text: item.target_text.clone(),
            shown_text: None,
            options: Vec::new(),
            user_answer: None,
            is_correct: None,
        }
    }

    /// Grade `response` without recording it.
    pub fn grade(&self, response: &str) -> bool {
        match self.question_type {
            QuestionType::TrueFalse => {
                let genuine = self.shown_text.as_deref() == Some(self.target_text.as_str());
                parse_judgment(response) == Some(genuine)
            }
            QuestionType::MultipleChoice => response.trim() == self.target_text,
            QuestionType::Writing => {
                response.trim().to_lowercase() == self.target_text.trim().to_lowercase()
            }
        }
    }
}

/// Parse a true/false judgment. Unrecognized input is `None`.
pub fn parse_judgment(response: &str) -> Option<bool> {
    match response.trim().to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Build the question sequence for `items` (a whole list) per `config`.
///
/// The requested count is capped at the filtered pool and split evenly
/// across the selected types, each taking `ceil(count / types)` items in
/// turn; later types may receive fewer.
pub fn generate_questions<R: Rng + ?Sized>(
    items: &[TranslationItem],
    config: &QuizConfig,
    rng: &mut R,
) -> VocabResult<Vec<Question>> {
    let mut types: Vec<QuestionType> = Vec::with_capacity(config.types.len());
    for t in &config.types {
        if !types.contains(t) {
            types.push(*t);
        }
    }
    if types.is_empty() {
        return Err(VocabError::NoTypeSelected);
    }
    if config.count == 0 {
        return Err(VocabError::InvalidInput("question count must be at least 1".into()));
    }

    let mut pool: Vec<&TranslationItem> = items
        .iter()
        .filter(|i| config.include_learned || !i.learned)
        .collect();
    if pool.is_empty() {
        return Err(VocabError::EmptySelection);
    }
    if config.random_order {
        pool.shuffle(rng);
    }

    let actual = config.count.min(pool.len());
    let per_type = actual.div_ceil(types.len());
    let mut questions = Vec::with_capacity(actual);

    for (chunk, question_type) in pool[..actual].chunks(per_type).zip(types.iter().copied()) {
        for item in chunk {
            let question = match question_type {
                QuestionType::TrueFalse => true_false(item, &pool, rng),
                QuestionType::MultipleChoice => multiple_choice(item, &pool, rng),
                QuestionType::Writing => Question::new(item, QuestionType::Writing),
            };
            questions.push(question);
        }
    }

    if config.random_order {
        questions.shuffle(rng);
    }
    Ok(questions)
}

fn true_false<R: Rng + ?Sized>(
    item: &TranslationItem,
    pool: &[&TranslationItem],
    rng: &mut R,
) -> Question {
    let mut question = Question::new(item, QuestionType::TrueFalse);
    let mut shown = item.target_text.clone();
    if rng.random_bool(0.5) {
        let decoys: Vec<&str> = pool
            .iter()
            .filter(|other| other.id != item.id && other.target_text != item.target_text)
            .map(|other| other.target_text.as_str())
            .collect();
        if let Some(decoy) = decoys.choose(rng) {
            shown = decoy.to_string();
        }
    }
    question.shown_text = Some(shown);
    question.options = vec!["true".into(), "false".into()];
    question
}

fn multiple_choice<R: Rng + ?Sized>(
    item: &TranslationItem,
    pool: &[&TranslationItem],
    rng: &mut R,
) -> Question {
    let mut incorrect: Vec<&str> = Vec::new();
    for other in pool {
        let text = other.target_text.as_str();
        if other.id != item.id && text != item.target_text && !incorrect.contains(&text) {
            incorrect.push(text);
        }
    }
    incorrect.shuffle(rng);

    let mut options = vec![item.target_text.clone()];
    options.extend(
        incorrect
            .into_iter()
            .take(MAX_OPTIONS - 1)
            .map(str::to_string),
    );
    options.shuffle(rng);

    let mut question = Question::new(item, QuestionType::MultipleChoice);
    question.options = options;
    question
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizState {
    InProgress,
    Finished,
}

/// A running quiz owned by its caller.
pub struct QuizSession {
    lists: ListManager,
    user_id: String,
    list: WordList,
    test_type: QuestionType,
    questions: Vec<Question>,
    index: usize,
    result: Option<TestResult>,
}

impl QuizSession {
    pub async fn start(
        lists: ListManager,
        user_id: &str,
        list_id: &str,
        config: QuizConfig,
    ) -> VocabResult<Self> {
        let (list, items) = load(&lists, user_id, list_id, &config).await?;
        let questions = generate_questions(&items, &config, &mut rand::rng())?;
        Ok(Self::new(lists, user_id, list, &config, questions))
    }

    /// Like [`start`](Self::start) with a caller-provided RNG.
    pub async fn start_with_rng<R: Rng + ?Sized + Send>(
        lists: ListManager,
        user_id: &str,
        list_id: &str,
        config: QuizConfig,
        rng: &mut R,
    ) -> VocabResult<Self> {
        let (list, items) = load(&lists, user_id, list_id, &config).await?;
        let questions = generate_questions(&items, &config, rng)?;
        Ok(Self::new(lists, user_id, list, &config, questions))
    }

    fn new(
        lists: ListManager,
        user_id: &str,
        list: WordList,
        config: &QuizConfig,
        questions: Vec<Question>,
    ) -> Self {
        tracing::debug!(list_id = %list.id, questions = questions.len(), "quiz started");
        Self {
            lists,
            user_id: user_id.to_string(),
            list,
            test_type: config.types[0],
            questions,
            index: 0,
            result: None,
        }
    }

    pub fn list(&self) -> &WordList {
        &self.list
    }

    pub fn state(&self) -> QuizState {
        if self.result.is_some() {
            QuizState::Finished
        } else {
            QuizState::InProgress
        }
    }

    pub fn current(&self) -> Option<&Question> {
        match self.state() {
            QuizState::InProgress => self.questions.get(self.index),
            QuizState::Finished => None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Every question, graded up to the current one.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The recorded result once finished.
    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    /// Grade `response` against the current question and move on.
    ///
    /// Answering the last question records the [`TestResult`] and marks
    /// every correctly answered item learned. If that fails the last answer
    /// is withdrawn and the quiz stays in progress.
    pub async fn answer(&mut self, response: &str) -> VocabResult<bool> {
        if self.state() == QuizState::Finished {
            return Err(VocabError::SessionClosed);
        }
        let Some(question) = self.questions.get_mut(self.index) else {
            return Err(VocabError::SessionClosed);
        };
        let correct = question.grade(response);
        question.user_answer = Some(response.to_string());
        question.is_correct = Some(correct);

        if self.index + 1 < self.questions.len() {
            self.index += 1;
            return Ok(correct);
        }

        let result = self.build_result();
        let correct_items: Vec<String> = self
            .questions
            .iter()
            .filter(|q| q.is_correct == Some(true))
            .map(|q| q.item_id.clone())
            .collect();
        if let Err(e) = self
            .lists
            .record_test_result(&self.user_id, &result, &correct_items)
            .await
        {
            let question = &mut self.questions[self.index];
            question.user_answer = None;
            question.is_correct = None;
            return Err(e);
        }

        tracing::info!(
            list_id = %self.list.id,
            "quiz finished: {}/{}",
            result.correct_answers,
            result.total_questions
        );
        self.index = self.questions.len();
        self.result = Some(result);
        Ok(correct)
    }

    fn build_result(&self) -> TestResult {
        let item_results: Vec<ItemOutcome> = self
            .questions
            .iter()
            .map(|q| ItemOutcome {
                item_id: q.item_id.clone(),
                correct: q.is_correct.unwrap_or(false),
                question_type: q.question_type,
            })
            .collect();
        TestResult {
            id: new_id(),
            list_id: self.list.id.clone(),
            test_type: self.test_type,
            date: chrono::Utc::now(),
            total_questions: item_results.len() as u32,
            correct_answers: item_results.iter().filter(|o| o.correct).count() as u32,
            item_results,
        }
    }
}

async fn load(
    lists: &ListManager,
    user_id: &str,
    list_id: &str,
    config: &QuizConfig,
) -> VocabResult<(WordList, Vec<TranslationItem>)> {
    if config.types.is_empty() {
        return Err(VocabError::NoTypeSelected);
    }
    let user = lists.user(user_id).await?;
    let list = lists.owned_list(&user, list_id).await?;
    let items = lists.stored_items(list_id).await?;
    Ok((list, items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lists::tests::fixture;
    use crate::lists::{NewItem, NewList};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn item(id: &str, target: &str) -> TranslationItem {
        TranslationItem {
            id: id.into(),
            list_id: "l".into(),
            source_text: format!("src-{id}"),
            target_text: target.into(),
            source_language: "en".into(),
            target_language: "fr".into(),
            created_at: chrono::Utc::now(),
            last_reviewed: None,
            difficulty: None,
            learned: false,
        }
    }

    fn config(types: &[QuestionType], count: usize) -> QuizConfig {
        QuizConfig {
            types: types.to_vec(),
            count,
            include_learned: true,
            random_order: false,
        }
    }

    #[test]
    fn setup_errors() {
        let mut rng = StdRng::seed_from_u64(1);
        let items = vec![item("a", "x")];
        assert!(matches!(
            generate_questions(&items, &config(&[], 3), &mut rng),
            Err(VocabError::NoTypeSelected)
        ));
        assert!(matches!(
            generate_questions(&[], &config(&[QuestionType::Writing], 3), &mut rng),
            Err(VocabError::EmptySelection)
        ));

        let mut learned = item("b", "y");
        learned.learned = true;
        let cfg = QuizConfig {
            include_learned: false,
            ..config(&[QuestionType::Writing], 3)
        };
        assert!(matches!(
            generate_questions(&[learned], &cfg, &mut rng),
            Err(VocabError::EmptySelection)
        ));
    }

    #[test]
    fn quotas_split_across_types() {
        let items: Vec<_> = (0..5).map(|i| item(&format!("i{i}"), &format!("t{i}"))).collect();
        let cfg = config(
            &[QuestionType::Writing, QuestionType::MultipleChoice, QuestionType::TrueFalse],
            10,
        );
        let questions = generate_questions(&items, &cfg, &mut StdRng::seed_from_u64(2)).unwrap();
        let kinds: Vec<_> = questions.iter().map(|q| q.question_type).collect();
        assert_eq!(
            kinds,
            vec![
                QuestionType::Writing,
                QuestionType::Writing,
                QuestionType::MultipleChoice,
                QuestionType::MultipleChoice,
                QuestionType::TrueFalse,
            ]
        );
    }

    #[test]
    fn later_types_may_get_nothing() {
        let items: Vec<_> = (0..2).map(|i| item(&format!("i{i}"), &format!("t{i}"))).collect();
        let cfg = config(
            &[QuestionType::Writing, QuestionType::MultipleChoice, QuestionType::TrueFalse],
            2,
        );
        let questions = generate_questions(&items, &cfg, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].question_type, QuestionType::MultipleChoice);
    }

    #[test]
    fn multiple_choice_options_contain_answer_once() {
        // Duplicated target texts must not inflate the option set.
        let targets = ["chien", "chat", "chat", "maison", "chien", "voiture", "livre"];
        let items: Vec<_> = targets
            .iter()
            .enumerate()
            .map(|(i, t)| item(&format!("i{i}"), t))
            .collect();
        for seed in 0..20 {
            let questions = generate_questions(
                &items,
                &QuizConfig {
                    random_order: true,
                    ..config(&[QuestionType::MultipleChoice], items.len())
                },
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap();
            for q in &questions {
                let hits = q.options.iter().filter(|o| **o == q.target_text).count();
                assert_eq!(hits, 1);
                let mut distinct = q.options.clone();
                distinct.sort();
                distinct.dedup();
                assert_eq!(distinct.len(), q.options.len());
                // Five distinct texts overall, so four incorrect ones exist.
                assert_eq!(q.options.len(), MAX_OPTIONS);
            }
        }
    }

    #[test]
    fn multiple_choice_with_few_distractors() {
        let items = vec![item("a", "un"), item("b", "un"), item("c", "deux")];
        let questions = generate_questions(
            &items,
            &config(&[QuestionType::MultipleChoice], 3),
            &mut StdRng::seed_from_u64(5),
        )
        .unwrap();
        // Each item has exactly one distinct incorrect text.
        assert!(questions.iter().all(|q| q.options.len() == 2));

        let single = vec![item("solo", "seul")];
        let questions = generate_questions(
            &single,
            &config(&[QuestionType::MultipleChoice], 1),
            &mut StdRng::seed_from_u64(5),
        )
        .unwrap();
        assert_eq!(questions[0].options, vec!["seul".to_string()]);
    }

    #[test]
    fn true_false_grading() {
        let mut q = Question::new(&item("a", "chien"), QuestionType::TrueFalse);
        q.shown_text = Some("chien".into());
        assert!(q.grade("true"));
        assert!(q.grade(" Y "));
        assert!(!q.grade("false"));
        assert!(!q.grade("maybe"));

        q.shown_text = Some("chat".into());
        assert!(q.grade("false"));
        assert!(!q.grade("true"));
    }

    #[test]
    fn true_false_decoys_differ() {
        let items = vec![item("a", "chien"), item("b", "chien"), item("c", "chat")];
        for seed in 0..20 {
            let questions = generate_questions(
                &items,
                &config(&[QuestionType::TrueFalse], 3),
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap();
            for q in &questions {
                let shown = q.shown_text.as_deref().unwrap();
                let expected = if q.target_text == "chat" { "chien" } else { "chat" };
                assert!(shown == q.target_text || shown == expected);
            }
        }
    }

    #[test]
    fn writing_grading_ignores_case_and_padding() {
        let q = Question::new(&item("a", "bonjour"), QuestionType::Writing);
        assert!(q.grade(" Bonjour "));
        assert!(!q.grade("bonsoir"));
        let mc = Question::new(&item("a", "bonjour"), QuestionType::MultipleChoice);
        assert!(mc.grade("bonjour"));
        assert!(!mc.grade("Bonjour"));
    }

    #[tokio::test]
    async fn writing_session_records_result() {
        let (manager, _, user) = fixture().await;
        let list = manager
            .create_list(&user, NewList::named("Greetings"))
            .await
            .unwrap();
        manager
            .add_item(&user, &list.id, NewItem::new("hello", "bonjour"))
            .await
            .unwrap();

        let mut quiz = QuizSession::start(
            manager.clone(),
            &user,
            &list.id,
            config(&[QuestionType::Writing], 1),
        )
        .await
        .unwrap();
        assert_eq!(quiz.len(), 1);
        assert!(quiz.answer(" Bonjour ").await.unwrap());
        assert_eq!(quiz.state(), QuizState::Finished);
        assert!(matches!(quiz.answer("x").await, Err(VocabError::SessionClosed)));

        let result = quiz.result().unwrap();
        assert_eq!(result.test_type, QuestionType::Writing);
        assert_eq!((result.total_questions, result.correct_answers), (1, 1));
        assert_eq!(quiz.questions()[0].user_answer.as_deref(), Some(" Bonjour "));

        let stats = manager.user_stats(&user).await.unwrap();
        assert_eq!(stats.tests_taken, 1);
        assert_eq!(stats.correct_answers, 1);
        assert_eq!(stats.learned_words, 1);
        assert_eq!(manager.results_for_list(&user, &list.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn wrong_answers_do_not_mark_learned() {
        let (manager, _, user) = fixture().await;
        let list = manager
            .create_list(&user, NewList::named("L"))
            .await
            .unwrap();
        for (s, t) in [("dog", "chien"), ("cat", "chat")] {
            manager
                .add_item(&user, &list.id, NewItem::new(s, t))
                .await
                .unwrap();
        }
        let mut quiz = QuizSession::start_with_rng(
            manager.clone(),
            &user,
            &list.id,
            config(&[QuestionType::Writing], 5),
            &mut StdRng::seed_from_u64(1),
        )
        .await
        .unwrap();
        assert!(quiz.answer("chien").await.unwrap());
        assert!(!quiz.answer("wrong").await.unwrap());

        let items = manager.items_for_list(&user, &list.id).await.unwrap();
        assert!(items[0].learned);
        assert!(!items[1].learned);
        let result = quiz.result().unwrap();
        assert_eq!(result.item_results.len(), 2);
        assert!(!result.item_results[1].correct);
    }

    #[tokio::test]
    async fn failed_recording_keeps_quiz_open() {
        let (manager, store, user) = fixture().await;
        let list = manager
            .create_list(&user, NewList::named("L"))
            .await
            .unwrap();
        manager
            .add_item(&user, &list.id, NewItem::new("hello", "bonjour"))
            .await
            .unwrap();
        let mut quiz = QuizSession::start(
            manager.clone(),
            &user,
            &list.id,
            config(&[QuestionType::Writing], 1),
        )
        .await
        .unwrap();

        store.set_read_only(true);
        assert!(matches!(
            quiz.answer("bonjour").await,
            Err(VocabError::PersistenceFailure(_))
        ));
        assert_eq!(quiz.state(), QuizState::InProgress);
        assert!(quiz.questions()[0].user_answer.is_none());

        store.set_read_only(false);
        assert!(quiz.answer("bonjour").await.unwrap());
        assert_eq!(quiz.state(), QuizState::Finished);
    }
}
