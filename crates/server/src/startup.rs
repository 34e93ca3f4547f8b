use std::{net::SocketAddr, path::PathBuf};

use configs::{AppConfig, LogFormat};
use migration::{Migrator, MigratorTrait};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use service::runtime::{self, Backend};

/// Initialize logging in the configured format via shared common utils
pub fn init_logging(format: LogFormat) {
    match format {
        LogFormat::Compact => common::utils::logging::init_logging_default(),
        LogFormat::Json => common::utils::logging::init_logging_json(),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &configs::ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {}:{}: {e}", cfg.host, cfg.port)))
}

/// Document store when a database URL is configured, file store otherwise.
pub async fn select_backend(cfg: &AppConfig) -> Result<Backend, StartupError> {
    if cfg.database.is_configured() {
        let db = models::db::connect_with_config(&cfg.database)
            .await
            .map_err(|e| StartupError::Storage(e.to_string()))?;
        Migrator::up(&db, None).await.map_err(|e| StartupError::Storage(e.to_string()))?;
        info!("database migrations applied");
        return Ok(Backend::Document { db });
    }
    common::env::ensure_data_dir(&cfg.storage.data_dir)
        .await
        .map_err(|e| StartupError::Storage(e.to_string()))?;
    Ok(Backend::File { data_dir: PathBuf::from(&cfg.storage.data_dir) })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; shutdown only on process exit");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, draining in-flight requests");
}

/// Build the app from `cfg` and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let backend = select_backend(&cfg).await?;
    let services = runtime::open_services(backend).await?;
    let app = routes::build_router(services, build_cors());

    let addr = bind_addr(&cfg.server)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "obscura server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_rejects_garbage_host() {
        let cfg = configs::ServerConfig { host: "not a host".into(), port: 8080, worker_threads: None };
        assert!(matches!(bind_addr(&cfg), Err(StartupError::InvalidConfig(_))));
        let ok = configs::ServerConfig { host: "0.0.0.0".into(), port: 9000, worker_threads: None };
        assert_eq!(bind_addr(&ok).map(|a| a.port()).ok(), Some(9000));
    }

    #[tokio::test]
    async fn file_backend_without_database_url() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("obscura_startup_{}", uuid::Uuid::new_v4()));
        let mut cfg = AppConfig::default();
        cfg.storage.data_dir = dir.to_string_lossy().into_owned();
        let backend = select_backend(&cfg).await?;
        assert!(matches!(backend, Backend::File { ref data_dir } if data_dir == &dir));
        assert!(dir.is_dir());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
