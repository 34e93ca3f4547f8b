//! Record persistence.
//!
//! [`RecordStore`] is the seam every service talks to. Three backends sit
//! behind it: a JSON array file per collection, a Postgres table holding one
//! JSONB document per record, and an in-memory store for tests and doc
//! examples. All of them validate on write and again on read; stored
//! elements that fail validation are skipped, never surfaced.

use async_trait::async_trait;
use common::metrics::CORRUPT_RECORDS_DROPPED_TOTAL;
use models::{Record, ValidationErrors};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::errors::ServiceError;

pub mod json_array_store;
pub mod memory;
pub mod seaorm;

pub use json_array_store::JsonArrayStore;
pub use memory::MemoryStore;
pub use seaorm::DocumentStore;

/// Upper bound on records returned by one listing from the document store.
pub const LIST_LIMIT: u64 = 200;

#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Every valid stored record, in storage order.
    async fn list_all(&self) -> Result<Vec<T>, ServiceError>;

    /// Persist one new record. It is validated before anything is written.
    async fn append_one(&self, record: &T) -> Result<(), ServiceError>;

    /// Add one to the integer `field` of the record with `id` and return the
    /// updated record, or `None` if no valid record has that id. Concurrent
    /// increments never lose updates.
    async fn increment_counter(&self, id: Uuid, field: &str) -> Result<Option<T>, ServiceError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Serialize `record` and check the result against its own schema.
pub(crate) fn to_document<T: Record>(record: &T) -> Result<Value, ServiceError> {
    let doc = serde_json::to_value(record)?;
    T::parse(&doc)?;
    Ok(doc)
}

/// Keep the valid records; log and count the rest.
pub(crate) fn drop_invalid<T: Record>(results: Vec<Result<T, ValidationErrors>>) -> Vec<T> {
    results
        .into_iter()
        .filter_map(|res| match res {
            Ok(record) => Some(record),
            Err(err) => {
                CORRUPT_RECORDS_DROPPED_TOTAL.inc();
                warn!(collection = T::COLLECTION, error = %err, "skipping stored record that fails validation");
                None
            }
        })
        .collect()
}

/// Position of the valid record with `id` among raw stored documents.
pub(crate) fn position_of<T: Record>(docs: &[Value], id: Uuid) -> Option<usize> {
    docs.iter().position(|doc| matches!(T::parse(doc), Ok(r) if r.id() == id))
}

/// Increment `field` of `doc` in place and return the revalidated record.
pub(crate) fn bump_counter<T: Record>(doc: &mut Value, field: &str) -> Result<T, ServiceError> {
    let current = doc.get(field).and_then(Value::as_u64).ok_or_else(|| {
        ServiceError::Validation(ValidationErrors::single(field, "Expected non-negative integer counter"))
    })?;
    let next = current
        .checked_add(1)
        .ok_or_else(|| ServiceError::Validation(ValidationErrors::single(field, "Counter overflow")))?;
    doc[field] = Value::from(next);
    Ok(T::parse(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::LeakRequest;
    use serde_json::json;

    fn request_doc(id: &str, likes: Value) -> Value {
        json!({
            "id": id,
            "title": "Expense report",
            "details": "Need the Q3 invoice from Dept X",
            "likes": likes,
            "createdAt": "2025-06-01T08:30:00.000Z"
        })
    }

    #[test]
    fn bump_counter_increments_and_revalidates() {
        let mut doc = request_doc("9b2f6a3e-1c1d-4c8e-9e57-2b0c0f1d3a44", json!(2));
        let updated: LeakRequest = bump_counter(&mut doc, "likes").unwrap();
        assert_eq!(updated.likes, 3);
        assert_eq!(doc["likes"], 3);
    }

    #[test]
    fn bump_counter_rejects_non_integer_fields() {
        let mut doc = request_doc("9b2f6a3e-1c1d-4c8e-9e57-2b0c0f1d3a44", json!(1));
        let err = bump_counter::<LeakRequest>(&mut doc, "title").err().unwrap();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn position_skips_invalid_documents_with_matching_id() {
        let id = "9b2f6a3e-1c1d-4c8e-9e57-2b0c0f1d3a44";
        let docs = vec![request_doc(id, json!("lots")), request_doc(id, json!(0))];
        assert_eq!(position_of::<LeakRequest>(&docs, Uuid::parse_str(id).unwrap()), Some(1));
        assert_eq!(position_of::<LeakRequest>(&docs, Uuid::new_v4()), None);
    }
}
