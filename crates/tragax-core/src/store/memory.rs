//! In-memory store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Document, Index, RecordKind, Store, Tables, WriteBatch};
use crate::error::StoreError;

/// A process-local store. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    read_only: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every commit while enabled. Reads keep working.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::Relaxed);
    }

    /// Number of documents stored for a kind.
    pub async fn count(&self, kind: RecordKind) -> usize {
        self.tables.read().await.len(kind)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, kind: RecordKind, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.tables.read().await.get(kind, id))
    }

    async fn get_all(&self, kind: RecordKind) -> Result<Vec<Document>, StoreError> {
        Ok(self.tables.read().await.all(kind))
    }

    async fn get_by_index(
        &self,
        kind: RecordKind,
        index: Index,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self.tables.read().await.by_index(kind, index, value))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if self.read_only.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("store is read-only".into()));
        }
        if batch.is_empty() {
            return Ok(());
        }
        let mut tables = self.tables.write().await;
        tables.apply(&batch)?;
        tracing::trace!(writes = batch.len(), "committed batch");
        Ok(())
    }
}
