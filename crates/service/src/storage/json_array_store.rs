use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use dashmap::DashMap;
use models::{schema::parse_each, Record};
use once_cell::sync::Lazy;
use serde_json::Value;
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{bump_counter, drop_invalid, position_of, to_document, RecordStore};
use crate::errors::ServiceError;

/// One writer lock per file, shared by every store instance in the process.
static WRITERS: Lazy<DashMap<PathBuf, Arc<Mutex<()>>>> = Lazy::new(DashMap::new);

fn writer_for(path: &Path) -> Arc<Mutex<()>> {
    let key = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    };
    WRITERS.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
}

enum Contents {
    Missing,
    Items(Vec<Value>),
    /// Present but not a JSON array.
    Unusable(String),
}

/// A collection persisted as one pretty-printed JSON array, newest first.
///
/// Reads never take the writer lock: every write goes to a temporary file in
/// the same directory and is renamed over the target, so a reader sees the
/// old document or the new one. Writes to one path are serialized. Elements
/// that fail validation are kept on disk untouched but never returned.
#[derive(Clone)]
pub struct JsonArrayStore<T> {
    file_path: PathBuf,
    writer: Arc<Mutex<()>>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> JsonArrayStore<T> {
    /// Open the store at `path`. Creates the parent directory; the file itself
    /// appears on first write.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let writer = writer_for(&file_path);
        Ok(Arc::new(Self { file_path, writer, _record: PhantomData }))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    async fn read(&self) -> Result<Contents, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Contents::Missing),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Contents::Missing);
        }
        Ok(match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Array(items)) => Contents::Items(items),
            Ok(other) => Contents::Unusable(format!("top-level {}", models::schema::type_name(&other))),
            Err(e) => Contents::Unusable(e.to_string()),
        })
    }

    /// Load the array for rewriting; refuses to replace a file that is not one.
    async fn read_for_write(&self) -> Result<Vec<Value>, ServiceError> {
        match self.read().await? {
            Contents::Missing => Ok(Vec::new()),
            Contents::Items(items) => Ok(items),
            Contents::Unusable(reason) => Err(ServiceError::Store(format!(
                "refusing to overwrite {}: not a JSON array ({reason})",
                self.file_path.display()
            ))),
        }
    }

    async fn write(&self, items: &[Value]) -> Result<(), ServiceError> {
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(items)?;
        let file_name = self.file_path.file_name().and_then(|n| n.to_str()).unwrap_or("records");
        let tmp = self.file_path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));
        fs::write(&tmp, data).await?;
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!(path = %self.file_path.display(), records = items.len(), "collection file rewritten");
        Ok(())
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for JsonArrayStore<T> {
    async fn list_all(&self) -> Result<Vec<T>, ServiceError> {
        let doc = match self.read().await? {
            Contents::Missing => return Ok(Vec::new()),
            Contents::Items(items) => Value::Array(items),
            Contents::Unusable(reason) => {
                warn!(path = %self.file_path.display(), %reason, "collection file is not a JSON array; listing as empty");
                return Ok(Vec::new());
            }
        };
        let results = parse_each::<T>(&doc).map_err(ServiceError::from)?;
        Ok(drop_invalid(results))
    }

    async fn append_one(&self, record: &T) -> Result<(), ServiceError> {
        let doc = to_document(record)?;
        let _guard = self.writer.lock().await;
        let mut items = self.read_for_write().await?;
        items.insert(0, doc);
        self.write(&items).await
    }

    async fn increment_counter(&self, id: Uuid, field: &str) -> Result<Option<T>, ServiceError> {
        let _guard = self.writer.lock().await;
        let mut items = match self.read().await? {
            Contents::Items(items) => items,
            Contents::Missing | Contents::Unusable(_) => return Ok(None),
        };
        let Some(idx) = position_of::<T>(&items, id) else {
            return Ok(None);
        };
        let updated = bump_counter::<T>(&mut items[idx], field)?;
        self.write(&items).await?;
        Ok(Some(updated))
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use models::{LeakRequest, Schema};
    use serde_json::json;

    fn tmp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("obscura_store_{}", Uuid::new_v4()))
            .join("requests.json")
    }

    fn request(title: &str, minutes_ago: i64) -> LeakRequest {
        LeakRequest {
            id: Uuid::new_v4(),
            title: title.to_string(),
            details: "Need the Q3 invoice from Dept X".to_string(),
            likes: 0,
            created_at: models::timestamp::now() - Duration::minutes(minutes_ago),
        }
    }

    async fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir).await;
        }
    }

    #[tokio::test]
    async fn missing_file_lists_empty() -> anyhow::Result<()> {
        let path = tmp_path();
        let store = JsonArrayStore::<LeakRequest>::new(&path).await?;
        assert!(store.list_all().await?.is_empty());
        assert!(!path.exists());
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn appends_newest_first_and_persists() -> anyhow::Result<()> {
        let path = tmp_path();
        let store = JsonArrayStore::<LeakRequest>::new(&path).await?;
        let first = request("First request", 5);
        let second = request("Second request", 1);
        store.append_one(&first).await?;
        store.append_one(&second).await?;

        let reopened = JsonArrayStore::<LeakRequest>::new(&path).await?;
        let listed = reopened.list_all().await?;
        assert_eq!(listed, vec![second, first]);

        let raw: Value = serde_json::from_slice(&fs::read(&path).await?)?;
        assert_eq!(raw.as_array().map(Vec::len), Some(2));
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_elements_are_hidden_but_preserved() -> anyhow::Result<()> {
        let path = tmp_path();
        let store = JsonArrayStore::<LeakRequest>::new(&path).await?;
        let good = request("Valid request", 3);
        let doc = json!([
            {"id": "garbage"},
            serde_json::to_value(&good)?,
            42
        ]);
        fs::write(&path, serde_json::to_vec(&doc)?).await?;

        assert_eq!(store.list_all().await?, vec![good.clone()]);

        let fresh = request("Fresh request", 0);
        store.append_one(&fresh).await?;
        let raw: Value = serde_json::from_slice(&fs::read(&path).await?)?;
        let items = raw.as_array().cloned().unwrap_or_default();
        assert_eq!(items.len(), 4);
        assert_eq!(items[1], json!({"id": "garbage"}));
        assert_eq!(items[3], json!(42));
        assert_eq!(store.list_all().await?, vec![fresh, good]);
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn non_array_document_reads_empty_and_is_not_overwritten() -> anyhow::Result<()> {
        let path = tmp_path();
        let store = JsonArrayStore::<LeakRequest>::new(&path).await?;
        fs::write(&path, br#"{"not": "an array"}"#).await?;

        assert!(store.list_all().await?.is_empty());
        let err = store.append_one(&request("Another request", 0)).await.err();
        assert!(matches!(err, Some(ServiceError::Store(_))));
        assert_eq!(fs::read(&path).await?, br#"{"not": "an array"}"#.to_vec());

        fs::write(&path, b"{ truncated").await?;
        assert!(store.list_all().await?.is_empty());
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn increment_updates_only_the_target() -> anyhow::Result<()> {
        let path = tmp_path();
        let store = JsonArrayStore::<LeakRequest>::new(&path).await?;
        let a = request("Request A", 2);
        let b = request("Request B", 1);
        store.append_one(&a).await?;
        store.append_one(&b).await?;

        let updated = store.increment_counter(a.id, "likes").await?;
        assert_eq!(updated.map(|r| r.likes), Some(1));
        assert!(store.increment_counter(Uuid::new_v4(), "likes").await?.is_none());

        let listed = store.list_all().await?;
        let likes: Vec<u64> = listed.iter().map(|r| r.likes).collect();
        assert_eq!(likes, vec![0, 1]);
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn increment_on_missing_file_is_none() -> anyhow::Result<()> {
        let path = tmp_path();
        let store = JsonArrayStore::<LeakRequest>::new(&path).await?;
        assert!(store.increment_counter(Uuid::new_v4(), "likes").await?.is_none());
        assert!(!path.exists());
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_increments_and_appends_lose_nothing() -> anyhow::Result<()> {
        let path = tmp_path();
        let store = JsonArrayStore::<LeakRequest>::new(&path).await?;
        let target = request("Popular request", 10);
        store.append_one(&target).await?;
        // A second handle on the same file shares the writer lock.
        let other = JsonArrayStore::<LeakRequest>::new(&path).await?;

        let mut tasks = Vec::new();
        for i in 0..20 {
            let s = if i % 2 == 0 { store.clone() } else { other.clone() };
            let id = target.id;
            tasks.push(tokio::spawn(async move { s.increment_counter(id, "likes").await }));
        }
        for i in 0..5 {
            let s = other.clone();
            let r = request(&format!("Side request {i}"), 0);
            tasks.push(tokio::spawn(async move { s.append_one(&r).await.map(|_| None) }));
        }
        for t in tasks {
            t.await??;
        }

        let listed = store.list_all().await?;
        assert_eq!(listed.len(), 6);
        let popular = listed.iter().find(|r| r.id == target.id).map(|r| r.likes);
        assert_eq!(popular, Some(20));
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn written_records_validate() -> anyhow::Result<()> {
        let path = tmp_path();
        let store = JsonArrayStore::<LeakRequest>::new(&path).await?;
        let mut bad = request("Valid title", 0);
        bad.details = "short".into();
        assert!(matches!(store.append_one(&bad).await, Err(ServiceError::Validation(_))));
        assert!(!path.exists());

        store.append_one(&request("Valid title", 0)).await?;
        let raw: Value = serde_json::from_slice(&fs::read(&path).await?)?;
        for item in raw.as_array().cloned().unwrap_or_default() {
            assert!(LeakRequest::parse(&item).is_ok());
        }
        cleanup(&path).await;
        Ok(())
    }
}
