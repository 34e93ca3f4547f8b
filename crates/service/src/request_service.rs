use std::sync::Arc;

use common::metrics::{REQUESTS_CREATED_TOTAL, REQUEST_LIKES_TOTAL};
use models::record::sort_newest_first;
use models::request::LIKES_FIELD;
use models::{CreateLeakRequest, LeakRequest, Schema};
use serde_json::Value;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::RecordStore;

/// Creation, listing and liking of leak requests.
#[derive(Clone)]
pub struct RequestService {
    store: Arc<dyn RecordStore<LeakRequest>>,
}

impl RequestService {
    pub fn new(store: Arc<dyn RecordStore<LeakRequest>>) -> Self { Self { store } }

    /// Validate an untrusted body and persist a new request with zero likes.
    ///
    /// # Examples
    /// ```
    /// use service::request_service::RequestService;
    /// use models::LeakRequest;
    /// use service::storage::MemoryStore;
    /// use std::sync::Arc;
    /// let svc = RequestService::new(Arc::new(MemoryStore::<LeakRequest>::new()));
    /// let body = serde_json::json!({"title": "Expense report", "details": "Need the Q3 invoice from Dept X"});
    /// let created = tokio_test::block_on(svc.create_request(&body)).unwrap();
    /// assert_eq!(created.likes, 0);
    /// let liked = tokio_test::block_on(svc.like_request(created.id)).unwrap();
    /// assert_eq!(liked.likes, 1);
    /// ```
    #[instrument(skip(self, body), fields(backend = self.store.backend()))]
    pub async fn create_request(&self, body: &Value) -> Result<LeakRequest, ServiceError> {
        let input = CreateLeakRequest::parse(body)?;
        let request = LeakRequest {
            id: Uuid::new_v4(),
            title: input.title,
            details: input.details,
            likes: 0,
            created_at: models::timestamp::now(),
        };
        self.store.append_one(&request).await?;
        REQUESTS_CREATED_TOTAL.inc();
        info!(request_id = %request.id, "request_created");
        Ok(request)
    }

    /// Every valid stored request, newest first.
    pub async fn list_requests(&self) -> Result<Vec<LeakRequest>, ServiceError> {
        let mut requests = self.store.list_all().await?;
        sort_newest_first(&mut requests);
        Ok(requests)
    }

    /// Add one like. Concurrent likes on the same request all count.
    #[instrument(skip(self), fields(backend = self.store.backend()))]
    pub async fn like_request(&self, id: Uuid) -> Result<LeakRequest, ServiceError> {
        let Some(updated) = self.store.increment_counter(id, LIKES_FIELD).await? else {
            debug!(%id, "like for unknown request");
            return Err(ServiceError::not_found("leak request"));
        };
        REQUEST_LIKES_TOTAL.inc();
        info!(request_id = %updated.id, likes = updated.likes, "request_liked");
        Ok(updated)
    }
}
