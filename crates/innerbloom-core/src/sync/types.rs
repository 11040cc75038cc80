//! Core types for journal synchronization.

use serde::{Deserialize, Serialize};

/// Counts from one drain of the sync queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Entries a reflection was requested for.
    pub attempted: usize,
    /// Entries that received a reflection and were stored.
    pub synced: usize,
    /// Entries left pending after a failed request.
    pub failed: usize,
    /// Entries skipped because a fetch for them was already outstanding
    /// or they were removed/completed while the run was in progress.
    pub skipped: usize,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.attempted == 0 && self.skipped == 0
    }
}

/// Result of asking the sync queue to drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DrainOutcome {
    Completed(SyncReport),
    /// Another drain was in progress; nothing was done.
    AlreadyRunning,
    /// Connectivity is offline; entries stay queued.
    Offline,
}

/// Current sync status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Journal entries still waiting for a reflection.
    pub pending_count: usize,
    /// Whether a drain is currently in progress.
    pub in_progress: bool,
    pub online: bool,
}
