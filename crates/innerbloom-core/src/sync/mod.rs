//! Offline journal synchronization.
//!
//! Journal entries written offline (or online but not yet reflected) are
//! drained through the remote enrichment service when connectivity returns,
//! on app start, or on manual retry.

pub mod connectivity;
pub mod sync_queue;
pub mod types;

pub use connectivity::Connectivity;
pub use sync_queue::{EntryClaim, Fetch, SyncQueue, SyncRun};
pub use types::{DrainOutcome, SyncReport, SyncStatus};
