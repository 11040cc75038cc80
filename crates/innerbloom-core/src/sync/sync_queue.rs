//! Offline journal sync queue.
//!
//! Every journal entry eventually gets its reflection, exactly once. Runs are
//! serialized by the queue itself: a second drain while one is in progress
//! returns [`DrainOutcome::AlreadyRunning`] without touching the network.
//! Within a run entries are processed one at a time, so there is never more
//! than one outstanding request.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::enrichment::Enricher;
use crate::error::EnrichmentError;
use crate::model::JournalEntry;
use crate::sync::types::{DrainOutcome, SyncReport};

/// Sync queue guarding reflection fetches.
#[derive(Debug, Default)]
pub struct SyncQueue {
    running: AtomicBool,
    /// Entry ids with a reflection request outstanding.
    in_flight: Mutex<HashSet<String>>,
}

/// Exclusive right to drain; released on drop, including when the drain
/// future is cancelled or fails.
pub struct SyncRun<'a> {
    queue: &'a SyncQueue,
}

/// Marks one entry as being fetched; released on drop.
pub struct EntryClaim<'a> {
    queue: &'a SyncQueue,
    id: String,
}

impl Drop for SyncRun<'_> {
    fn drop(&mut self) {
        self.queue.running.store(false, Ordering::SeqCst);
    }
}

impl Drop for EntryClaim<'_> {
    fn drop(&mut self) {
        self.queue.in_flight().remove(&self.id);
    }
}

impl SyncQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries that still need a reflection, in journal order.
    pub fn pending(entries: &[JournalEntry]) -> Vec<JournalEntry> {
        entries.iter().filter(|e| e.is_pending()).cloned().collect()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn in_flight(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim the queue for a drain, or `None` if one is already running.
    pub fn begin(&self) -> Option<SyncRun<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| SyncRun { queue: self })
    }

    /// Claim a single entry, or `None` if a fetch for it is outstanding.
    pub fn claim(&self, id: &str) -> Option<EntryClaim<'_>> {
        if self.in_flight().insert(id.to_string()) {
            Some(EntryClaim {
                queue: self,
                id: id.to_string(),
            })
        } else {
            None
        }
    }

    /// Fetch a reflection for one entry.
    ///
    /// The entry is claimed first, then `still_pending` is asked again so an
    /// entry completed by another caller never reaches the service twice.
    pub async fn reflect<P>(
        &self,
        entry: &JournalEntry,
        enricher: &dyn Enricher,
        still_pending: P,
    ) -> Fetch
    where
        P: Fn(&str) -> bool,
    {
        let Some(_claim) = self.claim(&entry.id) else {
            return Fetch::InFlight;
        };
        if !still_pending(entry.id.as_str()) {
            return Fetch::Settled;
        }
        Fetch::Fetched(enricher.journal_reflection(&entry.content).await)
    }
}

/// Result of [`SyncQueue::reflect`].
#[derive(Debug)]
pub enum Fetch {
    /// Another caller holds the claim for this entry.
    InFlight,
    /// The entry was reflected or removed before the request went out.
    Settled,
    Fetched(Result<String, EnrichmentError>),
}

impl SyncRun<'_> {
    /// Process `pending` sequentially.
    ///
    /// `still_pending` is consulted for each entry once it is claimed;
    /// entries that were settled in the meantime are skipped without a
    /// remote call. `apply` receives each entry carrying its new reflection
    /// and returns whether it was stored. Failed entries are left untouched
    /// for the next trigger.
    pub async fn process<P, F>(
        self,
        pending: Vec<JournalEntry>,
        enricher: &dyn Enricher,
        still_pending: P,
        mut apply: F,
    ) -> DrainOutcome
    where
        P: Fn(&str) -> bool,
        F: FnMut(JournalEntry) -> bool,
    {
        let mut report = SyncReport::default();

        for entry in pending {
            let result = match self.queue.reflect(&entry, enricher, &still_pending).await {
                Fetch::InFlight => {
                    tracing::debug!(entry = %entry.id, "reflection already in flight, skipping");
                    report.skipped += 1;
                    continue;
                }
                Fetch::Settled => {
                    tracing::debug!(entry = %entry.id, "entry settled during drain, skipping");
                    report.skipped += 1;
                    continue;
                }
                Fetch::Fetched(result) => result,
            };
            report.attempted += 1;

            match result {
                Ok(reflection) if reflection.trim().is_empty() => {
                    tracing::warn!(entry = %entry.id, "empty reflection, will retry");
                    report.failed += 1;
                }
                Ok(reflection) => {
                    if apply(entry.with_reflection(reflection)) {
                        report.synced += 1;
                    } else {
                        report.skipped += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(entry = %entry.id, error = %e, "reflection failed, will retry");
                    report.failed += 1;
                }
            }
        }

        if !report.is_empty() {
            tracing::info!(
                synced = report.synced,
                failed = report.failed,
                skipped = report.skipped,
                "sync queue drained"
            );
        }
        DrainOutcome::Completed(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingEnricher, StaticEnricher};
    use chrono::Utc;
    use std::time::Duration;

    fn entry(id: &str, content: &str, online: bool) -> JournalEntry {
        JournalEntry::new(id.into(), Utc::now(), content.into(), online)
    }

    #[test]
    fn pending_selects_unsynced_or_needing_reflection() {
        let done = entry("1", "a", false).with_reflection("r".into());
        let entries = vec![
            entry("3", "online", true),
            done,
            entry("2", "offline", false),
        ];
        let pending = SyncQueue::pending(&entries);
        let ids: Vec<_> = pending.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[tokio::test]
    async fn drain_applies_every_successful_reflection() {
        let queue = SyncQueue::new();
        let enricher = StaticEnricher::new("You are doing well.");
        let pending = vec![entry("1", "a", true), entry("2", "b", false)];
        let mut applied = Vec::new();

        let run = queue.begin().unwrap();
        let outcome = run
            .process(pending, &enricher, |_| true, |e| {
                applied.push(e);
                true
            })
            .await;

        assert_eq!(
            outcome,
            DrainOutcome::Completed(SyncReport { attempted: 2, synced: 2, failed: 0, skipped: 0 })
        );
        assert!(applied.iter().all(|e| e.synced && !e.needs_reflection));
        assert!(applied.iter().all(|e| e.reflection.as_deref() == Some("You are doing well.")));
        assert!(!queue.is_running());
    }

    #[tokio::test]
    async fn failures_are_not_applied() {
        let queue = SyncQueue::new();
        let mut applied = 0;
        let run = queue.begin().unwrap();
        let outcome = run
            .process(vec![entry("1", "a", true)], &FailingEnricher, |_| true, |_| {
                applied += 1;
                true
            })
            .await;

        assert_eq!(
            outcome,
            DrainOutcome::Completed(SyncReport { attempted: 1, synced: 0, failed: 1, skipped: 0 })
        );
        assert_eq!(applied, 0);
        assert!(!queue.is_running());
    }

    #[tokio::test]
    async fn rejected_applies_count_as_skipped() {
        let queue = SyncQueue::new();
        let enricher = StaticEnricher::new("r");
        let outcome = queue
            .begin()
            .unwrap()
            .process(vec![entry("1", "a", true)], &enricher, |_| true, |_| false)
            .await;
        assert_eq!(
            outcome,
            DrainOutcome::Completed(SyncReport { attempted: 1, synced: 0, failed: 0, skipped: 1 })
        );
    }

    #[tokio::test]
    async fn blank_reflection_counts_as_failure() {
        let queue = SyncQueue::new();
        let enricher = StaticEnricher::new("   ");
        let outcome = queue
            .begin()
            .unwrap()
            .process(vec![entry("1", "a", true)], &enricher, |_| true, |_| true)
            .await;
        assert_eq!(
            outcome,
            DrainOutcome::Completed(SyncReport { attempted: 1, synced: 0, failed: 1, skipped: 0 })
        );
    }

    #[test]
    fn only_one_run_at_a_time() {
        let queue = SyncQueue::new();
        let run = queue.begin().unwrap();
        assert!(queue.is_running());
        assert!(queue.begin().is_none());
        drop(run);
        assert!(!queue.is_running());
        assert!(queue.begin().is_some());
    }

    #[test]
    fn entry_claims_are_exclusive() {
        let queue = SyncQueue::new();
        let claim = queue.claim("1").unwrap();
        assert!(queue.claim("1").is_none());
        assert!(queue.claim("2").is_some());
        drop(claim);
        assert!(queue.claim("1").is_some());
    }

    #[tokio::test]
    async fn reflect_skips_entry_already_in_flight() {
        let queue = SyncQueue::new();
        let enricher = StaticEnricher::new("r").with_delay(Duration::from_millis(50));
        let e = entry("1", "a", true);

        let (first, second) = tokio::join!(
            queue.reflect(&e, &enricher, |_| true),
            queue.reflect(&e, &enricher, |_| true)
        );
        let fetched = [first, second]
            .into_iter()
            .filter(|f| matches!(f, Fetch::Fetched(_)))
            .count();
        assert_eq!(fetched, 1);
        assert_eq!(enricher.calls().len(), 1);
    }

    #[tokio::test]
    async fn settled_entries_are_skipped_without_a_remote_call() {
        let queue = SyncQueue::new();
        let enricher = StaticEnricher::new("r");
        let settled = Mutex::new(HashSet::from(["2".to_string()]));
        let pending = vec![entry("1", "a", true), entry("2", "b", true), entry("3", "c", true)];

        let outcome = queue
            .begin()
            .unwrap()
            .process(
                pending,
                &enricher,
                |id| !settled.lock().unwrap().contains(id),
                |e| settled.lock().unwrap().insert(e.id),
            )
            .await;

        assert_eq!(
            outcome,
            DrainOutcome::Completed(SyncReport { attempted: 2, synced: 2, failed: 0, skipped: 1 })
        );
        assert_eq!(enricher.calls(), vec!["a".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn cancelled_run_releases_the_queue() {
        let queue = SyncQueue::new();
        let enricher = StaticEnricher::new("r").with_delay(Duration::from_secs(5));
        let run = queue.begin().unwrap();
        let fut = run.process(vec![entry("1", "a", true)], &enricher, |_| true, |_| true);

        let timed_out = tokio::time::timeout(Duration::from_millis(20), fut).await;
        assert!(timed_out.is_err());
        assert!(!queue.is_running());
        assert!(queue.claim("1").is_some());
    }
}
