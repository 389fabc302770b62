//! Cache store trait definition for dependency injection.

use super::stats::CacheStats;
use super::types::{CacheEntry, CacheError};
use std::fmt;
use std::future::Future;

/// Handle to an opened cache partition.
///
/// Obtained from [`CacheStore::open`]; cheap to clone and pass around. A
/// handle never outlives the meaning of its name: stores resolve the
/// partition by name on every call, so a handle to a purged partition simply
/// behaves as empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionHandle {
    name: String,
}

impl PartitionHandle {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The partition name this handle refers to.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for PartitionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Abstraction over a namespaced key→response cache.
///
/// Backs both the request-interception strategies and the tile preloader.
/// Implementations must provide per-key last-writer-wins semantics; there are
/// no cross-key transactions.
///
/// Lookup failures caused by storage problems are reported as `None`; the
/// strategies treat unavailable storage exactly like a cache miss.
pub trait CacheStore: Send + Sync {
    /// Open a partition, creating it if absent. Idempotent.
    fn open(
        &self,
        partition: &str,
    ) -> impl Future<Output = Result<PartitionHandle, CacheError>> + Send;

    /// Look up an entry. `None` for both "not cached" and "cache unreadable".
    fn get(
        &self,
        partition: &PartitionHandle,
        key: &str,
    ) -> impl Future<Output = Option<CacheEntry>> + Send;

    /// Store an entry, overwriting any previous value for the key.
    fn put(
        &self,
        partition: &PartitionHandle,
        key: &str,
        entry: CacheEntry,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;

    /// Remove a single entry. Removing an absent key is not an error.
    fn delete(
        &self,
        partition: &PartitionHandle,
        key: &str,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;

    /// Delete all entries in a partition.
    fn clear(&self, partition: &PartitionHandle)
        -> impl Future<Output = Result<(), CacheError>> + Send;

    /// Names of all existing partitions.
    fn partitions(&self) -> impl Future<Output = Vec<String>> + Send;

    /// Delete every partition whose name starts with `prefix` but is not in
    /// `keep`. Returns the number of partitions removed.
    ///
    /// Invoked once at service activation so that version upgrades never
    /// leave orphaned partitions consuming storage.
    fn purge_stale_namespaces(
        &self,
        prefix: &str,
        keep: &[String],
    ) -> impl Future<Output = Result<usize, CacheError>> + Send;

    /// Aggregated statistics across all partitions.
    fn stats(&self) -> CacheStats;
}
