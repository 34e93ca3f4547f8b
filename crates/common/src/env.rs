//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::info;

/// Ensure the data directory used by the file backend exists and is a directory.
pub async fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    let meta = tokio::fs::metadata(data_dir).await?;
    if !meta.is_dir() {
        return Err(anyhow::anyhow!("{data_dir} exists but is not a directory"));
    }
    info!(%data_dir, "data directory ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_nested_data_dir() -> anyhow::Result<()> {
        let dir = std::env::temp_dir()
            .join(format!("obscura_env_{}", uuid::Uuid::new_v4()))
            .join("data");
        ensure_data_dir(&dir.to_string_lossy()).await?;
        assert!(tokio::fs::metadata(&dir).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(dir.parent().unwrap_or(&dir)).await;
        Ok(())
    }

    #[tokio::test]
    async fn rejects_plain_file() -> anyhow::Result<()> {
        let file = std::env::temp_dir().join(format!("obscura_env_{}.txt", uuid::Uuid::new_v4()));
        tokio::fs::write(&file, b"x").await?;
        assert!(ensure_data_dir(&file.to_string_lossy()).await.is_err());
        let _ = tokio::fs::remove_file(&file).await;
        Ok(())
    }
}
