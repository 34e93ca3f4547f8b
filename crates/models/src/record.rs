use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::schema::Schema;

/// A persisted entity: validated on the way in and again on every read.
pub trait Record: Schema + Serialize + Clone + Send + Sync + 'static {
    /// Collection name; also the table name in the document store.
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Newest first. Stable, so records sharing a timestamp keep store order.
pub fn sort_newest_first<T: Record>(records: &mut [T]) {
    records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}
