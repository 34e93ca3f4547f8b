use std::marker::PhantomData;

use async_trait::async_trait;
use models::Record;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{bump_counter, drop_invalid, position_of, to_document, RecordStore};
use crate::errors::ServiceError;

/// Process-local store for tests and doc examples. Holds raw documents so
/// corrupt entries can be seeded with [`MemoryStore::with_documents`].
pub struct MemoryStore<T> {
    docs: RwLock<Vec<Value>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self { docs: RwLock::new(Vec::new()), _record: PhantomData }
    }
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw documents, newest first, valid or not.
    pub fn with_documents(docs: Vec<Value>) -> Self {
        Self { docs: RwLock::new(docs), _record: PhantomData }
    }

    pub async fn documents(&self) -> Vec<Value> {
        self.docs.read().await.clone()
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for MemoryStore<T> {
    async fn list_all(&self) -> Result<Vec<T>, ServiceError> {
        let docs = self.docs.read().await;
        Ok(drop_invalid(docs.iter().map(T::parse).collect()))
    }

    async fn append_one(&self, record: &T) -> Result<(), ServiceError> {
        let doc = to_document(record)?;
        self.docs.write().await.insert(0, doc);
        Ok(())
    }

    async fn increment_counter(&self, id: Uuid, field: &str) -> Result<Option<T>, ServiceError> {
        let mut docs = self.docs.write().await;
        let Some(idx) = position_of::<T>(&docs, id) else {
            return Ok(None);
        };
        // Work on a copy so a failed bump leaves the stored document intact.
        let mut doc = docs[idx].clone();
        let updated = bump_counter::<T>(&mut doc, field)?;
        docs[idx] = doc;
        Ok(Some(updated))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
