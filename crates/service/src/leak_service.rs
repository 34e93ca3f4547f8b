use std::sync::Arc;

use common::metrics::LEAKS_PUBLISHED_TOTAL;
use models::record::sort_newest_first;
use models::{Leak, PublishLeak, Schema};
use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::RecordStore;

/// Publication and listing of leaks.
#[derive(Clone)]
pub struct LeakService {
    store: Arc<dyn RecordStore<Leak>>,
}

impl LeakService {
    pub fn new(store: Arc<dyn RecordStore<Leak>>) -> Self { Self { store } }

    /// Validate an untrusted publication body and persist it as a new leak.
    ///
    /// The description is trimmed and clipped to 500 characters; id and
    /// creation time are assigned here.
    ///
    /// # Examples
    /// ```
    /// use service::leak_service::LeakService;
    /// use models::Leak;
    /// use service::storage::MemoryStore;
    /// use std::sync::Arc;
    /// let svc = LeakService::new(Arc::new(MemoryStore::<Leak>::new()));
    /// let body = serde_json::json!({
    ///     "description": "  Offer letter from Corp  ",
    ///     "proof": { "isLocal": true, "blueprintSlug": "zkemail/offer@v1" }
    /// });
    /// let leak = tokio_test::block_on(svc.publish(&body)).unwrap();
    /// assert_eq!(leak.description, "Offer letter from Corp");
    /// let listed = tokio_test::block_on(svc.list_published()).unwrap();
    /// assert_eq!(listed[0].id, leak.id);
    /// ```
    #[instrument(skip(self, body), fields(backend = self.store.backend()))]
    pub async fn publish(&self, body: &Value) -> Result<Leak, ServiceError> {
        let input = PublishLeak::parse(body)?;
        let leak = Leak {
            id: Uuid::new_v4(),
            description: input.clipped_description(),
            proof: input.proof,
            created_at: models::timestamp::now(),
        };
        self.store.append_one(&leak).await?;
        LEAKS_PUBLISHED_TOTAL.inc();
        info!(leak_id = %leak.id, blueprint = %leak.proof.blueprint_slug, is_local = leak.proof.is_local, "leak_published");
        Ok(leak)
    }

    /// Every valid stored leak, newest first.
    pub async fn list_published(&self) -> Result<Vec<Leak>, ServiceError> {
        let mut leaks = self.store.list_all().await?;
        sort_newest_first(&mut leaks);
        Ok(leaks)
    }
}
