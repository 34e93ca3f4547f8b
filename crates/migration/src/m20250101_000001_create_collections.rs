//! Create the `leaks` and `leak_requests` collections.
//! Each row holds the public document as JSONB plus `_created_at`, a
//! storage-only sort key that never appears in responses.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [Collection::Leaks, Collection::LeakRequests] {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(uuid(Document::Id).primary_key())
                        .col(json_binary(Document::Document).not_null())
                        .col(timestamp_with_time_zone(Document::CreatedAt).not_null())
                        .to_owned(),
                )
                .await?;

            // Listings read newest-first
            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{}_created_at", table.to_string()))
                        .table(table)
                        .col(Document::CreatedAt)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [Collection::Leaks, Collection::LeakRequests] {
            manager.drop_table(Table::drop().table(table).if_exists().to_owned()).await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum Collection {
    Leaks,
    LeakRequests,
}

#[derive(DeriveIden)]
enum Document {
    Id,
    Document,
    #[sea_orm(iden = "_created_at")]
    CreatedAt,
}
