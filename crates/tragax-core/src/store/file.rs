//! JSON-file-backed store.
//!
//! The whole database is one JSON object with an array per table. Each commit
//! rewrites the file through a temporary sibling and a rename, and only then
//! publishes the new state in memory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{Document, Index, RecordKind, Store, Tables, WriteBatch};
use crate::error::StoreError;

pub struct JsonFileStore {
    path: PathBuf,
    tables: RwLock<Tables>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading it if the file exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let tables = match tokio::fs::read_to_string(&path).await {
            Ok(content) => load_tables(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Tables::default(),
            Err(e) => return Err(io_error(&path, e)),
        };
        tracing::debug!(path = %path.display(), "opened data file");
        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, tables: &Tables) -> Result<(), StoreError> {
        let mut root = Map::new();
        for kind in RecordKind::ALL {
            root.insert(kind.table().to_string(), Value::Array(tables.all(kind)));
        }
        let json = serde_json::to_string_pretty(&Value::Object(root))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| io_error(parent, e))?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;
        Ok(())
    }
}

fn load_tables(content: &str) -> Result<Tables, StoreError> {
    let root: Map<String, Value> = serde_json::from_str(content)?;
    let mut tables = Tables::default();
    let mut batch = WriteBatch::new();
    for kind in RecordKind::ALL {
        if let Some(Value::Array(docs)) = root.get(kind.table()) {
            for doc in docs {
                batch.put_document(kind, doc.clone());
            }
        }
    }
    tables.apply(&batch)?;
    Ok(tables)
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl Store for JsonFileStore {
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
        if batch.is_empty() {
            return Ok(());
        }
        let mut guard = self.tables.write().await;
        let mut next = guard.clone();
        next.apply(&batch)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }
}
