//! Backend selection at startup.
//!
//! The binary decides once which [`Backend`] to use; [`open_services`] wires
//! both collections to it and hands back the services.

use std::path::PathBuf;
use std::sync::Arc;

use models::{Leak, LeakRequest};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::errors::ServiceError;
use crate::leak_service::LeakService;
use crate::request_service::RequestService;
use crate::storage::{DocumentStore, JsonArrayStore, RecordStore};

pub const LEAKS_FILE: &str = "leaks.json";
pub const REQUESTS_FILE: &str = "requests.json";

pub enum Backend {
    /// One JSON array file per collection under `data_dir`.
    File { data_dir: PathBuf },
    /// Postgres tables, already migrated.
    Document { db: DatabaseConnection },
}

#[derive(Clone)]
pub struct Services {
    pub leaks: Arc<LeakService>,
    pub requests: Arc<RequestService>,
}

pub async fn open_services(backend: Backend) -> Result<Services, ServiceError> {
    let (leaks, requests): (Arc<dyn RecordStore<Leak>>, Arc<dyn RecordStore<LeakRequest>>) = match backend {
        Backend::File { data_dir } => {
            info!(data_dir = %data_dir.display(), "using file record store");
            let leaks: Arc<dyn RecordStore<Leak>> = JsonArrayStore::<Leak>::new(data_dir.join(LEAKS_FILE)).await?;
            let requests: Arc<dyn RecordStore<LeakRequest>> = JsonArrayStore::<LeakRequest>::new(data_dir.join(REQUESTS_FILE)).await?;
            (leaks, requests)
        }
        Backend::Document { db } => {
            info!("using document record store");
            let leaks: Arc<dyn RecordStore<Leak>> = Arc::new(DocumentStore::<Leak>::new(db.clone()));
            let requests: Arc<dyn RecordStore<LeakRequest>> = Arc::new(DocumentStore::<LeakRequest>::new(db));
            (leaks, requests)
        }
    };
    Ok(Services {
        leaks: Arc::new(LeakService::new(leaks)),
        requests: Arc::new(RequestService::new(requests)),
    })
}
