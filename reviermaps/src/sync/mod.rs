//! Background replay of mutations attempted while offline.

mod queue;

pub use queue::{
    BackgroundSyncQueue, DrainReport, OperationKind, OperationReplayer, PendingOperation,
    DEFAULT_RETRY_BUDGET, SYNC_TAG,
};
