//! Persistent store abstraction.
//!
//! A store holds four tables of JSON documents keyed by their `id` field,
//! with a secondary `listId` index on items and test results. Writes go
//! through [`WriteBatch`] so a record change and the counter change that
//! accompanies it land together or not at all.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{TestResult, TranslationItem, User, WordList};

/// A stored record in its serialized form.
pub type Document = serde_json::Value;

/// The four record tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "users")]
    User,
    #[serde(rename = "lists")]
    List,
    #[serde(rename = "items")]
    Item,
    #[serde(rename = "testResults")]
    TestResult,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::User,
        RecordKind::List,
        RecordKind::Item,
        RecordKind::TestResult,
    ];

    /// Table name, as used in the on-disk layout.
    pub fn table(self) -> &'static str {
        match self {
            RecordKind::User => "users",
            RecordKind::List => "lists",
            RecordKind::Item => "items",
            RecordKind::TestResult => "testResults",
        }
    }

    /// Secondary indexes maintained for this kind.
    pub fn indexes(self) -> &'static [Index] {
        match self {
            RecordKind::Item | RecordKind::TestResult => &[Index::ListId],
            RecordKind::User | RecordKind::List => &[],
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Secondary indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    ListId,
}

impl Index {
    /// The document field the index reads.
    pub fn field(self) -> &'static str {
        match self {
            Index::ListId => "listId",
        }
    }
}

/// One write inside a batch.
#[derive(Debug, Clone)]
pub enum Write {
    /// Insert or replace by id.
    Put { kind: RecordKind, record: Document },
    /// Remove by id. Removing a missing id is not an error.
    Delete { kind: RecordKind, id: String },
}

/// An ordered set of writes applied atomically by [`Store::commit`].
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an upsert of a typed record.
    pub fn put<T: Record>(&mut self, record: &T) -> Result<&mut Self, StoreError> {
        let document = serde_json::to_value(record)?;
        self.writes.push(Write::Put {
            kind: T::KIND,
            record: document,
        });
        Ok(self)
    }

    /// Queue an upsert of a raw document.
    pub fn put_document(&mut self, kind: RecordKind, record: Document) -> &mut Self {
        self.writes.push(Write::Put { kind, record });
        self
    }

    pub fn delete(&mut self, kind: RecordKind, id: impl Into<String>) -> &mut Self {
        self.writes.push(Write::Delete {
            kind,
            id: id.into(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }
}

/// Key-value store over the four record kinds.
///
/// Implementations must apply a [`WriteBatch`] atomically: after a failed
/// commit no write of the batch is visible.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch one document by id.
    async fn get(&self, kind: RecordKind, id: &str) -> Result<Option<Document>, StoreError>;

    /// Fetch every document of a kind, in insertion order.
    async fn get_all(&self, kind: RecordKind) -> Result<Vec<Document>, StoreError>;

    /// Fetch documents whose indexed field equals `value`, in insertion order.
    async fn get_by_index(
        &self,
        kind: RecordKind,
        index: Index,
        value: &str,
    ) -> Result<Vec<Document>, StoreError>;

    /// Apply a batch of writes atomically.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Insert or replace one document.
    async fn put(&self, kind: RecordKind, record: Document) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.put_document(kind, record);
        self.commit(batch).await
    }

    /// Remove one document.
    async fn delete(&self, kind: RecordKind, id: &str) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.delete(kind, id);
        self.commit(batch).await
    }
}

/// A typed record stored in one of the tables.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const KIND: RecordKind;
    fn id(&self) -> &str;
}

impl Record for User {
    const KIND: RecordKind = RecordKind::User;
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for WordList {
    const KIND: RecordKind = RecordKind::List;
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for TranslationItem {
    const KIND: RecordKind = RecordKind::Item;
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for TestResult {
    const KIND: RecordKind = RecordKind::TestResult;
    fn id(&self) -> &str {
        &self.id
    }
}

/// Typed helpers over any [`Store`].
#[async_trait]
pub trait StoreExt: Store {
    async fn fetch<T: Record>(&self, id: &str) -> Result<Option<T>, StoreError> {
        match self.get(T::KIND, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    async fn fetch_all<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        decode_all(self.get_all(T::KIND).await?)
    }

    async fn fetch_by_list<T: Record>(&self, list_id: &str) -> Result<Vec<T>, StoreError> {
        decode_all(self.get_by_index(T::KIND, Index::ListId, list_id).await?)
    }

    async fn save<T: Record>(&self, record: &T) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.put(record)?;
        self.commit(batch).await
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

fn decode_all<T: Record>(docs: Vec<Document>) -> Result<Vec<T>, StoreError> {
    docs.into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
        .collect()
}

// ---------------------------------------------------------------------------
// Table storage shared by the in-memory and file-backed stores
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Row {
    seq: u64,
    document: Document,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    next_seq: u64,
    tables: HashMap<RecordKind, HashMap<String, Row>>,
}

impl Tables {
    pub(crate) fn get(&self, kind: RecordKind, id: &str) -> Option<Document> {
        self.tables
            .get(&kind)
            .and_then(|t| t.get(id))
            .map(|row| row.document.clone())
    }

    pub(crate) fn all(&self, kind: RecordKind) -> Vec<Document> {
        self.filtered(kind, |_| true)
    }

    pub(crate) fn by_index(&self, kind: RecordKind, index: Index, value: &str) -> Vec<Document> {
        if !kind.indexes().contains(&index) {
            return Vec::new();
        }
        self.filtered(kind, |doc| {
            doc.get(index.field()).and_then(|v| v.as_str()) == Some(value)
        })
    }

    fn filtered(&self, kind: RecordKind, keep: impl Fn(&Document) -> bool) -> Vec<Document> {
        let Some(table) = self.tables.get(&kind) else {
            return Vec::new();
        };
        let mut rows: Vec<&Row> = table.values().filter(|row| keep(&row.document)).collect();
        rows.sort_by_key(|row| row.seq);
        rows.into_iter().map(|row| row.document.clone()).collect()
    }

    /// Apply every write or none. Validation happens before any mutation.
    pub(crate) fn apply(&mut self, batch: &WriteBatch) -> Result<(), StoreError> {
        for write in batch.writes() {
            if let Write::Put { record, .. } = write {
                document_id(record)?;
            }
        }
        for write in batch.writes() {
            match write {
                Write::Put { kind, record } => {
                    let id = document_id(record)?.to_string();
                    let next_seq = &mut self.next_seq;
                    let table = self.tables.entry(*kind).or_default();
                    match table.get_mut(&id) {
                        Some(row) => row.document = record.clone(),
                        None => {
                            *next_seq += 1;
                            table.insert(
                                id,
                                Row {
                                    seq: *next_seq,
                                    document: record.clone(),
                                },
                            );
                        }
                    }
                }
                Write::Delete { kind, id } => {
                    if let Some(table) = self.tables.get_mut(kind) {
                        table.remove(id);
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn len(&self, kind: RecordKind) -> usize {
        self.tables.get(&kind).map(|t| t.len()).unwrap_or(0)
    }
}

fn document_id(document: &Document) -> Result<&str, StoreError> {
    document
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or(StoreError::MissingId)
}
