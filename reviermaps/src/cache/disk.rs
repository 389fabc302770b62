//! Disk-backed cache store.
//!
//! Partitions map to subdirectories under the cache root; entries are stored
//! as a payload file named by the SHA-256 of the cache key plus a JSON
//! metadata sidecar. The index is rebuilt by scanning the sidecars on
//! startup, so a half-written entry from a crashed run is simply invisible.
//!
//! Eviction runs after writes once the configured byte budget is exceeded,
//! oldest entries first, draining runtime partitions before static ones.

use super::stats::CacheStats;
use super::store::{CacheStore, PartitionHandle};
use super::types::{CacheEntry, CacheError, DiskStoreConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Metadata sidecar persisted next to every payload file.
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    key: String,
    content_type: String,
    stored_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    payload_path: PathBuf,
    meta_path: PathBuf,
    content_type: String,
    stored_at: DateTime<Utc>,
    size: usize,
}

type Index = HashMap<String, HashMap<String, IndexEntry>>;

/// Persistent implementation of [`CacheStore`].
pub struct DiskCacheStore {
    root: PathBuf,
    max_size_bytes: usize,
    index: Mutex<Index>,
    stats: Mutex<CacheStats>,
}

impl DiskCacheStore {
    /// Create a store rooted at `config.root`, scanning any existing
    /// partitions to rebuild the index.
    pub fn new(config: DiskStoreConfig) -> Result<Self, CacheError> {
        fs::create_dir_all(&config.root)?;

        let store = Self {
            root: config.root,
            max_size_bytes: config.max_size_bytes,
            index: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::new()),
        };
        store.scan()?;
        store.refresh_usage();
        Ok(store)
    }

    /// Filesystem path of a partition directory.
    fn partition_dir(&self, partition: &str) -> PathBuf {
        self.root.join(partition)
    }

    fn file_stem_for_key(key: &str) -> String {
        hex::encode(Sha256::digest(key.as_bytes()))
    }

    fn validate(partition: &str) -> Result<(), CacheError> {
        if partition.is_empty()
            || partition.contains('/')
            || partition.contains('\\')
            || partition.starts_with('.')
        {
            return Err(CacheError::InvalidPartition(partition.to_string()));
        }
        Ok(())
    }

    /// Rebuild the index by walking partition directories and reading
    /// metadata sidecars. Unreadable entries are skipped, not fatal.
    fn scan(&self) -> Result<(), CacheError> {
        let mut index = self.index.lock().unwrap_or_else(|e| e.into_inner());
        index.clear();

        for dir_entry in fs::read_dir(&self.root)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_dir() {
                continue;
            }
            let partition = dir_entry.file_name().to_string_lossy().to_string();
            let entries = index.entry(partition.clone()).or_default();

            for file in fs::read_dir(dir_entry.path())? {
                let file = file?;
                let path = file.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }

                let meta: EntryMeta = match fs::read(&path).ok().and_then(|raw| {
                    serde_json::from_slice(&raw).ok()
                }) {
                    Some(meta) => meta,
                    None => {
                        warn!(path = %path.display(), "Skipping unreadable cache metadata");
                        continue;
                    }
                };

                let payload_path = path.with_extension("bin");
                let size = match fs::metadata(&payload_path) {
                    Ok(m) => m.len() as usize,
                    Err(_) => {
                        warn!(path = %payload_path.display(), "Cache payload missing, skipping");
                        continue;
                    }
                };

                entries.insert(
                    meta.key.clone(),
                    IndexEntry {
                        payload_path,
                        meta_path: path,
                        content_type: meta.content_type,
                        stored_at: meta.stored_at,
                        size,
                    },
                );
            }
        }

        Ok(())
    }

    fn refresh_usage(&self) {
        let (entries, size) = {
            let index = self.index.lock().unwrap_or_else(|e| e.into_inner());
            let entries: usize = index.values().map(|p| p.len()).sum();
            let size: usize = index
                .values()
                .flat_map(|p| p.values())
                .map(|e| e.size)
                .sum();
            (entries, size)
        };
        if let Ok(mut stats) = self.stats.lock() {
            stats.update_usage(entries, size);
        }
    }

    /// Evict oldest entries until total size fits the budget.
    ///
    /// Runtime partitions (names ending in `-runtime`) are drained before
    /// static ones; within each group the oldest `stored_at` goes first.
    async fn evict_to_budget(&self) {
        let victims: Vec<(String, String, IndexEntry)> = {
            let index = self.index.lock().unwrap_or_else(|e| e.into_inner());
            let mut total: usize = index
                .values()
                .flat_map(|p| p.values())
                .map(|e| e.size)
                .sum();
            if total <= self.max_size_bytes {
                return;
            }

            let mut candidates: Vec<(String, String, IndexEntry)> = index
                .iter()
                .flat_map(|(part, entries)| {
                    entries
                        .iter()
                        .map(|(key, e)| (part.clone(), key.clone(), e.clone()))
                })
                .collect();

            // Static partitions sort after runtime ones, newest last
            candidates.sort_by_key(|(part, _, e)| {
                (!part.ends_with("-runtime"), e.stored_at)
            });

            let mut picked = Vec::new();
            for victim in candidates {
                if total <= self.max_size_bytes {
                    break;
                }
                total = total.saturating_sub(victim.2.size);
                picked.push(victim);
            }
            picked
        };

        let mut evicted = 0u64;
        for (partition, key, entry) in victims {
            let _ = tokio::fs::remove_file(&entry.payload_path).await;
            let _ = tokio::fs::remove_file(&entry.meta_path).await;
            let mut index = self.index.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(p) = index.get_mut(&partition) {
                p.remove(&key);
            }
            evicted += 1;
        }

        if evicted > 0 {
            debug!(evicted, "Disk cache eviction pass complete");
            if let Ok(mut stats) = self.stats.lock() {
                stats.record_evictions(evicted);
            }
            self.refresh_usage();
        }
    }
}

impl CacheStore for DiskCacheStore {
    async fn open(&self, partition: &str) -> Result<PartitionHandle, CacheError> {
        Self::validate(partition)?;
        tokio::fs::create_dir_all(self.partition_dir(partition)).await?;
        self.index
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(partition.to_string())
            .or_default();
        Ok(PartitionHandle::new(partition))
    }

    async fn get(&self, partition: &PartitionHandle, key: &str) -> Option<CacheEntry> {
        let indexed = {
            let index = self.index.lock().unwrap_or_else(|e| e.into_inner());
            index
                .get(partition.name())
                .and_then(|p| p.get(key).cloned())
        };

        let entry = match indexed {
            Some(ie) => match tokio::fs::read(&ie.payload_path).await {
                Ok(payload) => Some(CacheEntry {
                    payload: payload.into(),
                    content_type: ie.content_type,
                    stored_at: ie.stored_at,
                }),
                Err(e) => {
                    // Unreadable payload counts as a miss; drop the index entry
                    // so we stop retrying the read.
                    warn!(key, error = %e, "Cache payload unreadable, treating as miss");
                    let mut index = self.index.lock().unwrap_or_else(|e| e.into_inner());
                    if let Some(p) = index.get_mut(partition.name()) {
                        p.remove(key);
                    }
                    None
                }
            },
            None => None,
        };

        if let Ok(mut stats) = self.stats.lock() {
            match entry {
                Some(_) => stats.record_hit(),
                None => stats.record_miss(),
            }
        }

        entry
    }

    async fn put(
        &self,
        partition: &PartitionHandle,
        key: &str,
        entry: CacheEntry,
    ) -> Result<(), CacheError> {
        let dir = self.partition_dir(partition.name());
        tokio::fs::create_dir_all(&dir).await?;

        let stem = Self::file_stem_for_key(key);
        let payload_path = dir.join(format!("{stem}.bin"));
        let meta_path = dir.join(format!("{stem}.json"));

        let meta = EntryMeta {
            key: key.to_string(),
            content_type: entry.content_type.clone(),
            stored_at: entry.stored_at,
        };

        tokio::fs::write(&payload_path, &entry.payload).await?;
        tokio::fs::write(&meta_path, serde_json::to_vec(&meta)?).await?;

        {
            let mut index = self.index.lock().unwrap_or_else(|e| e.into_inner());
            index.entry(partition.name().to_string()).or_default().insert(
                key.to_string(),
                IndexEntry {
                    payload_path,
                    meta_path,
                    content_type: entry.content_type,
                    stored_at: entry.stored_at,
                    size: entry.payload.len(),
                },
            );
        }

        if let Ok(mut stats) = self.stats.lock() {
            stats.record_put();
        }
        self.refresh_usage();
        self.evict_to_budget().await;
        Ok(())
    }

    async fn delete(&self, partition: &PartitionHandle, key: &str) -> Result<(), CacheError> {
        let removed = {
            let mut index = self.index.lock().unwrap_or_else(|e| e.into_inner());
            index.get_mut(partition.name()).and_then(|p| p.remove(key))
        };

        if let Some(entry) = removed {
            let _ = tokio::fs::remove_file(&entry.payload_path).await;
            let _ = tokio::fs::remove_file(&entry.meta_path).await;
        }

        if let Ok(mut stats) = self.stats.lock() {
            stats.record_delete();
        }
        self.refresh_usage();
        Ok(())
    }

    async fn clear(&self, partition: &PartitionHandle) -> Result<(), CacheError> {
        let dir = self.partition_dir(partition.name());
        if tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&dir).await?;
        }
        tokio::fs::create_dir_all(&dir).await?;

        self.index
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(partition.name().to_string(), HashMap::new());
        self.refresh_usage();
        Ok(())
    }

    async fn partitions(&self) -> Vec<String> {
        let index = self.index.lock().unwrap_or_else(|e| e.into_inner());
        index.keys().cloned().collect()
    }

    async fn purge_stale_namespaces(
        &self,
        prefix: &str,
        keep: &[String],
    ) -> Result<usize, CacheError> {
        let stale: Vec<String> = {
            let index = self.index.lock().unwrap_or_else(|e| e.into_inner());
            index
                .keys()
                .filter(|name| name.starts_with(prefix) && !keep.contains(name))
                .cloned()
                .collect()
        };

        for name in &stale {
            let dir = self.partition_dir(name);
            if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                warn!(partition = %name, error = %e, "Failed to remove stale partition");
            }
            self.index
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(name);
            tracing::info!(partition = %name, "Purged stale cache partition");
        }

        self.refresh_usage();
        Ok(stale.len())
    }

    fn stats(&self) -> CacheStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir, max_size: usize) -> DiskCacheStore {
        DiskCacheStore::new(DiskStoreConfig {
            root: dir.path().to_path_buf(),
            max_size_bytes: max_size,
        })
        .unwrap()
    }

    fn entry(data: &[u8]) -> CacheEntry {
        CacheEntry::new(data.to_vec(), "application/x-protobuf")
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, 1_000_000);
        let h = store.open("maps-runtime").await.unwrap();

        store
            .put(&h, "/api/maps/tiles/streets/14/8606/5626.pbf", entry(b"tile"))
            .await
            .unwrap();

        let got = store
            .get(&h, "/api/maps/tiles/streets/14/8606/5626.pbf")
            .await
            .unwrap();
        assert_eq!(&got.payload[..], b"tile");
        assert_eq!(got.content_type, "application/x-protobuf");
    }

    #[tokio::test]
    async fn test_index_rebuilt_after_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = store_in(&dir, 1_000_000);
            let h = store.open("maps-v1").await.unwrap();
            store.put(&h, "/api/maps/styles", entry(b"{}")).await.unwrap();
        }

        // New store instance over the same root sees the entry
        let store = store_in(&dir, 1_000_000);
        let h = store.open("maps-v1").await.unwrap();
        let got = store.get(&h, "/api/maps/styles").await.unwrap();
        assert_eq!(&got.payload[..], b"{}");
    }

    #[tokio::test]
    async fn test_corrupt_metadata_is_a_miss() {
        let dir = TempDir::new().unwrap();
        {
            let store = store_in(&dir, 1_000_000);
            let h = store.open("maps-v1").await.unwrap();
            store.put(&h, "k", entry(b"data")).await.unwrap();
        }

        // Corrupt every sidecar
        for f in fs::read_dir(dir.path().join("maps-v1")).unwrap() {
            let path = f.unwrap().path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                fs::write(&path, b"not json").unwrap();
            }
        }

        let store = store_in(&dir, 1_000_000);
        let h = store.open("maps-v1").await.unwrap();
        assert!(store.get(&h, "k").await.is_none());
    }

    #[tokio::test]
    async fn test_eviction_prefers_runtime_partition() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, 2_500);
        let static_part = store.open("maps-v1").await.unwrap();
        let runtime = store.open("maps-runtime").await.unwrap();

        let mut static_entry = entry(&[0u8; 1000]);
        // Make the static entry strictly older than the runtime ones so age
        // alone would pick it first; partition preference must win instead.
        static_entry.stored_at = Utc::now() - chrono::Duration::seconds(60);
        store.put(&static_part, "style", static_entry).await.unwrap();
        store.put(&runtime, "tile-1", entry(&[0u8; 1000])).await.unwrap();
        store.put(&runtime, "tile-2", entry(&[0u8; 1000])).await.unwrap();

        // Budget of 2500 forces one eviction; the runtime tile goes first
        assert!(store.get(&static_part, "style").await.is_some());
        let surviving_tiles = [
            store.get(&runtime, "tile-1").await.is_some(),
            store.get(&runtime, "tile-2").await.is_some(),
        ]
        .iter()
        .filter(|x| **x)
        .count();
        assert_eq!(surviving_tiles, 1);
    }

    #[tokio::test]
    async fn test_clear_partition() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, 1_000_000);
        let h = store.open("maps-runtime").await.unwrap();

        store.put(&h, "a", entry(b"1")).await.unwrap();
        store.put(&h, "b", entry(b"2")).await.unwrap();
        store.clear(&h).await.unwrap();

        assert!(store.get(&h, "a").await.is_none());
        assert!(store.get(&h, "b").await.is_none());
    }

    #[tokio::test]
    async fn test_purge_stale_namespaces_removes_directories() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, 1_000_000);
        for name in ["maps-v1", "maps-v2", "maps-runtime"] {
            store.open(name).await.unwrap();
        }

        let keep = vec!["maps-v2".to_string(), "maps-runtime".to_string()];
        let purged = store.purge_stale_namespaces("maps-", &keep).await.unwrap();

        assert_eq!(purged, 1);
        assert!(!dir.path().join("maps-v1").exists());
        assert!(dir.path().join("maps-v2").exists());
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_collide_on_disk() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, 1_000_000);
        let h = store.open("maps-runtime").await.unwrap();

        store.put(&h, "/route?body_hash=aa", entry(b"route-a")).await.unwrap();
        store.put(&h, "/route?body_hash=bb", entry(b"route-b")).await.unwrap();

        assert_eq!(
            &store.get(&h, "/route?body_hash=aa").await.unwrap().payload[..],
            b"route-a"
        );
        assert_eq!(
            &store.get(&h, "/route?body_hash=bb").await.unwrap().payload[..],
            b"route-b"
        );
    }
}
