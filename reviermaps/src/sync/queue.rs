//! Offline mutation queue.
//!
//! Mutating calls issued while offline are recorded as pending operations
//! and replayed in strict FIFO order once connectivity returns, so that
//! create/update/delete sequences on the same logical resource stay
//! causally correct. An operation that keeps failing is dropped after its
//! retry budget and counted in the drain report instead of retrying forever.

use crate::backend::BackendError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Sync tag recognized on reconnect.
pub const SYNC_TAG: &str = "background-route-sync";

/// Default replay attempts before an operation is dropped.
pub const DEFAULT_RETRY_BUDGET: u32 = 3;

/// Kind of a queued mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        };
        write!(f, "{}", s)
    }
}

/// A mutation recorded while offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub id: u64,
    pub kind: OperationKind,
    pub payload: serde_json::Value,
    pub queued_at: DateTime<Utc>,
    pub attempts: u32,
}

/// Replays queued operations against the backend.
///
/// The trait seam lets tests drive the queue with a scripted backend.
pub trait OperationReplayer: Send + Sync {
    /// Replay one operation. `Err` counts against the operation's budget.
    fn replay(
        &self,
        operation: &PendingOperation,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Tally returned by [`BackgroundSyncQueue::drain`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Operations replayed successfully
    pub successful: usize,
    /// Operations dropped after exhausting the retry budget
    pub failed: usize,
}

/// FIFO queue of operations awaiting replay.
#[derive(Debug)]
pub struct BackgroundSyncQueue {
    operations: Mutex<VecDeque<PendingOperation>>,
    next_id: AtomicU64,
    retry_budget: u32,
}

impl BackgroundSyncQueue {
    /// Queue with the default retry budget.
    pub fn new() -> Self {
        Self::with_retry_budget(DEFAULT_RETRY_BUDGET)
    }

    /// Queue with a custom per-operation retry budget.
    pub fn with_retry_budget(retry_budget: u32) -> Self {
        Self {
            operations: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(1),
            retry_budget: retry_budget.max(1),
        }
    }

    /// Record a mutation for later replay. Returns its id.
    pub fn enqueue(&self, kind: OperationKind, payload: serde_json::Value) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let operation = PendingOperation {
            id,
            kind,
            payload,
            queued_at: Utc::now(),
            attempts: 0,
        };

        debug!(id, %kind, "Queued offline operation");
        self.operations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(operation);
        id
    }

    /// Number of operations waiting for replay.
    pub fn len(&self) -> usize {
        self.operations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the queued operations in replay order.
    pub fn pending(&self) -> Vec<PendingOperation> {
        self.operations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    /// Replay all queued operations sequentially.
    ///
    /// Operations are processed strictly in issue order. A failing operation
    /// is retried in place (the queue does not advance past it) until its
    /// budget is exhausted, then dropped and counted as failed.
    pub async fn drain<R>(&self, replayer: &R) -> DrainReport
    where
        R: OperationReplayer,
    {
        let mut report = DrainReport::default();

        loop {
            // Take the front without holding the lock across the replay await.
            let operation = {
                let mut ops = self.operations.lock().unwrap_or_else(|e| e.into_inner());
                match ops.pop_front() {
                    Some(op) => op,
                    None => break,
                }
            };

            match replayer.replay(&operation).await {
                Ok(()) => {
                    debug!(id = operation.id, kind = %operation.kind, "Replayed offline operation");
                    report.successful += 1;
                }
                Err(e) => {
                    let mut operation = operation;
                    operation.attempts += 1;

                    if operation.attempts >= self.retry_budget {
                        warn!(
                            id = operation.id,
                            kind = %operation.kind,
                            attempts = operation.attempts,
                            error = %e,
                            "Dropping operation after exhausting retry budget"
                        );
                        report.failed += 1;
                    } else {
                        debug!(
                            id = operation.id,
                            attempts = operation.attempts,
                            error = %e,
                            "Replay failed, keeping operation at queue front"
                        );
                        self.operations
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .push_front(operation);
                    }
                }
            }
        }

        info!(
            successful = report.successful,
            failed = report.failed,
            "Background sync drain complete"
        );
        report
    }
}

impl Default for BackgroundSyncQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    /// Scripted backend recording replay order; can fail specific operation
    /// kinds a configured number of times.
    #[derive(Default)]
    struct ScriptedReplayer {
        replayed: StdMutex<Vec<(OperationKind, serde_json::Value)>>,
        failures: StdMutex<HashMap<OperationKind, u32>>,
    }

    impl ScriptedReplayer {
        fn failing(kind: OperationKind, times: u32) -> Self {
            let replayer = Self::default();
            replayer.failures.lock().unwrap().insert(kind, times);
            replayer
        }

        fn order(&self) -> Vec<OperationKind> {
            self.replayed.lock().unwrap().iter().map(|(k, _)| *k).collect()
        }
    }

    impl OperationReplayer for ScriptedReplayer {
        async fn replay(&self, operation: &PendingOperation) -> Result<(), BackendError> {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&operation.kind) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(BackendError::Http("backend unavailable".to_string()));
                }
            }
            drop(failures);

            self.replayed
                .lock()
                .unwrap()
                .push((operation.kind, operation.payload.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_drain_preserves_fifo_order() {
        let queue = BackgroundSyncQueue::new();
        queue.enqueue(OperationKind::Create, json!({"id": 7}));
        queue.enqueue(OperationKind::Update, json!({"id": 7, "name": "Revier Mitte"}));
        queue.enqueue(OperationKind::Delete, json!({"id": 7}));

        let replayer = ScriptedReplayer::default();
        let report = queue.drain(&replayer).await;

        assert_eq!(report.successful, 3);
        assert_eq!(report.failed, 0);
        assert_eq!(
            replayer.order(),
            vec![
                OperationKind::Create,
                OperationKind::Update,
                OperationKind::Delete
            ]
        );
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_update_failing_three_times_is_dropped() {
        let queue = BackgroundSyncQueue::new();
        queue.enqueue(OperationKind::Create, json!({"id": 7}));
        queue.enqueue(OperationKind::Update, json!({"id": 7}));
        queue.enqueue(OperationKind::Delete, json!({"id": 7}));

        // Update fails exactly 3 times (the whole budget)
        let replayer = ScriptedReplayer::failing(OperationKind::Update, 3);
        let report = queue.drain(&replayer).await;

        assert_eq!(report.successful, 2, "create and delete succeed");
        assert_eq!(report.failed, 1, "update is dropped, not retried forever");
        assert_eq!(
            replayer.order(),
            vec![OperationKind::Create, OperationKind::Delete]
        );
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_transient_failure_recovers_in_order() {
        let queue = BackgroundSyncQueue::new();
        queue.enqueue(OperationKind::Create, json!({"id": 1}));
        queue.enqueue(OperationKind::Update, json!({"id": 1}));

        // One failure, then success: the update must still run before
        // anything queued after it.
        let replayer = ScriptedReplayer::failing(OperationKind::Create, 1);
        queue.enqueue(OperationKind::Delete, json!({"id": 1}));

        let report = queue.drain(&replayer).await;

        assert_eq!(report.successful, 3);
        assert_eq!(report.failed, 0);
        assert_eq!(
            replayer.order(),
            vec![
                OperationKind::Create,
                OperationKind::Update,
                OperationKind::Delete
            ]
        );
    }

    #[tokio::test]
    async fn test_drain_empty_queue() {
        let queue = BackgroundSyncQueue::new();
        let replayer = ScriptedReplayer::default();
        let report = queue.drain(&replayer).await;

        assert_eq!(report, DrainReport::default());
    }

    #[test]
    fn test_enqueue_assigns_monotonic_ids() {
        let queue = BackgroundSyncQueue::new();
        let a = queue.enqueue(OperationKind::Create, json!({}));
        let b = queue.enqueue(OperationKind::Update, json!({}));

        assert!(b > a);
        assert_eq!(queue.len(), 2);

        let pending = queue.pending();
        assert_eq!(pending[0].id, a);
        assert_eq!(pending[0].attempts, 0);
    }

    #[test]
    fn test_sync_tag() {
        assert_eq!(SYNC_TAG, "background-route-sync");
    }
}
