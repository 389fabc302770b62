//! In-memory cache store.
//!
//! The default store for tests and for deployments that do not want
//! persistence. Partitions are nested concurrent maps; per-key operations are
//! linearizable through the map's shard locks.

use super::stats::CacheStats;
use super::store::{CacheStore, PartitionHandle};
use super::types::{CacheEntry, CacheError};
use dashmap::DashMap;
use std::sync::Mutex;

/// Concurrent in-memory implementation of [`CacheStore`].
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    partitions: DashMap<String, DashMap<String, CacheEntry>>,
    stats: Mutex<CacheStats>,
}

impl MemoryCacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries across all partitions.
    pub fn entry_count(&self) -> usize {
        self.partitions.iter().map(|p| p.value().len()).sum()
    }

    /// Total payload size across all partitions in bytes.
    pub fn size_bytes(&self) -> usize {
        self.partitions
            .iter()
            .map(|p| p.value().iter().map(|e| e.value().size_bytes()).sum::<usize>())
            .sum()
    }

    fn refresh_usage(&self) {
        let entries = self.entry_count();
        let size = self.size_bytes();
        if let Ok(mut stats) = self.stats.lock() {
            stats.update_usage(entries, size);
        }
    }

    fn validate(partition: &str) -> Result<(), CacheError> {
        if partition.is_empty() || partition.contains('/') || partition.contains('\\') {
            return Err(CacheError::InvalidPartition(partition.to_string()));
        }
        Ok(())
    }
}

impl CacheStore for MemoryCacheStore {
    async fn open(&self, partition: &str) -> Result<PartitionHandle, CacheError> {
        Self::validate(partition)?;
        self.partitions
            .entry(partition.to_string())
            .or_default();
        Ok(PartitionHandle::new(partition))
    }

    async fn get(&self, partition: &PartitionHandle, key: &str) -> Option<CacheEntry> {
        let entry = self
            .partitions
            .get(partition.name())
            .and_then(|p| p.get(key).map(|e| e.value().clone()));

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
        self.partitions
            .entry(partition.name().to_string())
            .or_default()
            .insert(key.to_string(), entry);

        if let Ok(mut stats) = self.stats.lock() {
            stats.record_put();
        }
        self.refresh_usage();
        Ok(())
    }

    async fn delete(&self, partition: &PartitionHandle, key: &str) -> Result<(), CacheError> {
        if let Some(p) = self.partitions.get(partition.name()) {
            p.remove(key);
        }
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_delete();
        }
        self.refresh_usage();
        Ok(())
    }

    async fn clear(&self, partition: &PartitionHandle) -> Result<(), CacheError> {
        if let Some(p) = self.partitions.get(partition.name()) {
            p.clear();
        }
        self.refresh_usage();
        Ok(())
    }

    async fn partitions(&self) -> Vec<String> {
        self.partitions.iter().map(|p| p.key().clone()).collect()
    }

    async fn purge_stale_namespaces(
        &self,
        prefix: &str,
        keep: &[String],
    ) -> Result<usize, CacheError> {
        let stale: Vec<String> = self
            .partitions
            .iter()
            .map(|p| p.key().clone())
            .filter(|name| name.starts_with(prefix) && !keep.contains(name))
            .collect();

        for name in &stale {
            self.partitions.remove(name);
            tracing::info!(partition = %name, "Purged stale cache partition");
        }

        self.refresh_usage();
        Ok(stale.len())
    }

    fn stats(&self) -> CacheStats {
        self.stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}
