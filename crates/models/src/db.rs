use std::time::Duration;

use configs::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::errors::ModelError;

/// Open the process-wide connection pool. Call once at startup and pass the
/// handle to whatever needs it; it is cheap to clone and safe to share.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<DatabaseConnection, ModelError> {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opt).await.map_err(|e| ModelError::Db(e.to_string()))?;
    info!(max_connections = cfg.max_connections, "database pool ready");
    Ok(db)
}

/// Connect using `DATABASE_URL` with default pool settings; `None` when unset.
pub async fn connect_from_env() -> Result<Option<DatabaseConnection>, ModelError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => {
            let cfg = DatabaseConfig { url, ..DatabaseConfig::default() };
            connect_with_config(&cfg).await.map(Some)
        }
        _ => Ok(None),
    }
}
