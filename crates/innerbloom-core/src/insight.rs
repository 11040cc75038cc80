//! Daily insight trigger.
//!
//! At most one insight per calendar day, only once there is enough check-in
//! history. A failed request leaves the document untouched so the next
//! trigger retries; the caller shows [`fallback::INSIGHT`] meanwhile.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enrichment::{fallback, Enricher};
use crate::model::{CheckIn, JournalEntry, UserDocument};
use crate::storage::InsightsConfig;

/// Result of a daily insight trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum InsightOutcome {
    /// A new insight was generated and stored.
    Generated(String),
    /// Already generated today, or not enough check-ins yet.
    NotDue,
    /// Another trigger is in progress.
    AlreadyRunning,
    /// The service failed; nothing was stored.
    Fallback(String),
}

impl InsightOutcome {
    /// Text to display, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            InsightOutcome::Generated(text) | InsightOutcome::Fallback(text) => Some(text),
            InsightOutcome::NotDue | InsightOutcome::AlreadyRunning => None,
        }
    }
}

/// Recent history sent to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightInputs {
    pub check_ins: Vec<CheckIn>,
    pub entries: Vec<JournalEntry>,
}

/// Busy flag plus the insight rules.
#[derive(Debug, Default)]
pub struct InsightTrigger {
    config: InsightsConfig,
    running: AtomicBool,
}

/// Held while an insight request is outstanding.
pub struct InsightRun<'a> {
    trigger: &'a InsightTrigger,
}

impl Drop for InsightRun<'_> {
    fn drop(&mut self) {
        self.trigger.running.store(false, Ordering::SeqCst);
    }
}

impl InsightTrigger {
    pub fn new(config: InsightsConfig) -> Self {
        Self {
            config,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether an insight should be generated for `today`.
    pub fn is_due(&self, doc: &UserDocument, today: NaiveDate) -> bool {
        doc.last_insight_date != Some(today) && doc.check_ins.len() >= self.config.min_check_ins
    }

    /// Newest check-ins and journal entries within the configured windows.
    pub fn inputs(&self, doc: &UserDocument) -> InsightInputs {
        InsightInputs {
            check_ins: doc
                .check_ins
                .iter()
                .take(self.config.check_in_window)
                .cloned()
                .collect(),
            entries: doc
                .journal
                .iter()
                .take(self.config.journal_window)
                .cloned()
                .collect(),
        }
    }

    /// Claim the trigger, or `None` if a request is already outstanding.
    pub fn begin(&self) -> Option<InsightRun<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InsightRun { trigger: self })
    }

    /// Prepend `insight`, keep the newest few and stamp `today`.
    pub fn record(&self, doc: &mut UserDocument, insight: String, today: NaiveDate) {
        doc.insights.insert(0, insight);
        doc.insights.truncate(self.config.keep);
        doc.last_insight_date = Some(today);
    }
}

impl InsightRun<'_> {
    /// Ask the service for an insight. Empty answers count as failures.
    pub async fn fetch(&self, inputs: &InsightInputs, enricher: &dyn Enricher) -> Option<String> {
        match enricher.daily_insight(&inputs.check_ins, &inputs.entries).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                tracing::warn!("empty daily insight, using fallback");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "daily insight unavailable, using fallback");
                None
            }
        }
    }
}

/// Display text for a failed insight.
pub fn fallback_outcome() -> InsightOutcome {
    InsightOutcome::Fallback(fallback::INSIGHT.to_string())
}
