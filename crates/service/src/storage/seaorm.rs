use std::marker::PhantomData;

use async_trait::async_trait;
use models::Record;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement, TransactionTrait};
use tracing::warn;
use uuid::Uuid;

use super::{drop_invalid, to_document, RecordStore, LIST_LIMIT};
use crate::errors::ServiceError;

#[derive(Debug, FromQueryResult)]
struct DocumentRow {
    document: serde_json::Value,
}

/// Postgres-backed store: one table per collection, one JSONB document per
/// row, keyed by the record id and indexed on `_created_at`.
///
/// Listing returns at most [`LIST_LIMIT`] records, newest first. Increments
/// run as a single `UPDATE ... RETURNING`, so the row lock serializes them.
/// Rows whose counter is not a non-negative integer, or whose updated
/// document fails validation, are treated as absent and left untouched.
#[derive(Clone)]
pub struct DocumentStore<T> {
    db: DatabaseConnection,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> DocumentStore<T> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, _record: PhantomData }
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for DocumentStore<T> {
    async fn list_all(&self) -> Result<Vec<T>, ServiceError> {
        let sql = format!("SELECT document FROM {} ORDER BY _created_at DESC LIMIT $1", T::COLLECTION);
        let rows = DocumentRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &sql,
            [(LIST_LIMIT as i64).into()],
        ))
        .all(&self.db)
        .await?;
        Ok(drop_invalid(rows.iter().map(|row| T::parse(&row.document)).collect()))
    }

    async fn append_one(&self, record: &T) -> Result<(), ServiceError> {
        let doc = to_document(record)?;
        let sql = format!("INSERT INTO {} (id, document, _created_at) VALUES ($1, $2, $3)", T::COLLECTION);
        self.db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                &sql,
                [record.id().into(), doc.into(), record.created_at().into()],
            ))
            .await?;
        Ok(())
    }

    async fn increment_counter(&self, id: Uuid, field: &str) -> Result<Option<T>, ServiceError> {
        let sql = format!(
            "UPDATE {} SET document = jsonb_set(document, ARRAY[$2::text], \
             to_jsonb((document->>$2::text)::bigint + 1)) \
             WHERE id = $1 \
             AND jsonb_typeof(document->$2::text) = 'number' \
             AND (document->>$2::text) ~ '^[0-9]{{1,18}}$' \
             RETURNING document",
            T::COLLECTION
        );
        let txn = self.db.begin().await?;
        let row = DocumentRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &sql,
            [id.into(), field.to_string().into()],
        ))
        .one(&txn)
        .await?;
        let Some(row) = row else {
            txn.rollback().await?;
            return Ok(None);
        };
        match T::parse(&row.document) {
            Ok(record) => {
                txn.commit().await?;
                Ok(Some(record))
            }
            Err(err) => {
                txn.rollback().await?;
                warn!(collection = T::COLLECTION, %id, error = %err, "skipping increment of invalid document");
                Ok(None)
            }
        }
    }

    fn backend(&self) -> &'static str {
        "document"
    }
}
