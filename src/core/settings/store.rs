// ─── Settings Store ───
// Async key-value persistence keyed by (collection, id).

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::warn;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::paths::write_atomic;

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> LauncherResult<Option<Value>>;

    async fn put(&self, collection: &str, id: &str, value: Value) -> LauncherResult<()>;

    async fn delete(&self, collection: &str, id: &str) -> LauncherResult<()>;

    /// Every record of a collection, ordered by id.
    async fn list(&self, collection: &str) -> LauncherResult<Vec<(String, Value)>>;
}

/// One pretty-printed JSON document per collection: `<dir>/<collection>.json`.
///
/// Documents are replaced whole through a temp file, so `get` and `list`
/// never observe a half-written collection.
pub struct JsonFileStore {
    dir: PathBuf,
    // Read-modify-write of a collection file must not interleave.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    async fn read_collection(&self, collection: &str) -> LauncherResult<BTreeMap<String, Value>> {
        let path = self.collection_path(collection);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(LauncherError::io(path, e)),
        };

        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!("Discarding unreadable settings collection {:?}: {}", path, e);
                Ok(BTreeMap::new())
            }
        }
    }

    async fn write_collection(
        &self,
        collection: &str,
        records: &BTreeMap<String, Value>,
    ) -> LauncherResult<()> {
        let json = serde_json::to_string_pretty(records)?;
        write_atomic(&self.collection_path(collection), &json).await
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn get(&self, collection: &str, id: &str) -> LauncherResult<Option<Value>> {
        Ok(self.read_collection(collection).await?.remove(id))
    }

    async fn put(&self, collection: &str, id: &str, value: Value) -> LauncherResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_collection(collection).await?;
        records.insert(id.to_string(), value);
        self.write_collection(collection, &records).await
    }

    async fn delete(&self, collection: &str, id: &str) -> LauncherResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_collection(collection).await?;
        if records.remove(id).is_some() {
            self.write_collection(collection, &records).await?;
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> LauncherResult<Vec<(String, Value)>> {
        Ok(self.read_collection(collection).await?.into_iter().collect())
    }
}

/// Volatile store, used by tests and by shells that persist elsewhere.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> LauncherResult<Option<Value>> {
        let collections = self.collections.lock().await;
        Ok(collections
            .get(collection)
            .and_then(|records| records.get(id))
            .cloned())
    }

    async fn put(&self, collection: &str, id: &str, value: Value) -> LauncherResult<()> {
        self.collections
            .lock()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), value);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> LauncherResult<()> {
        if let Some(records) = self.collections.lock().await.get_mut(collection) {
            records.remove(id);
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> LauncherResult<Vec<(String, Value)>> {
        let collections = self.collections.lock().await;
        Ok(collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(id, value)| (id.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
