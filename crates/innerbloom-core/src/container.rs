//! Explicit state container for the user document.
//!
//! The container owns the one `UserDocument`, the catalog, configuration,
//! the connectivity flag and the busy flags of the sync queue and insight
//! trigger. Every command mutates a working copy, swaps it in only on
//! success, and saves. A failed save does not roll the state back: it is
//! logged and surfaced as [`CommandOutcome::persist_warning`], and the next
//! save writes the full document again.
//!
//! The document lock is never held across an `.await`, so remote calls can
//! overlap with other commands.

use std::sync::{Mutex, MutexGuard};

use chrono::{Days, Local, NaiveDate, Utc};
use serde::Serialize;

use crate::achievements::{AchievementEvaluator, AchievementEvent, Unlocks};
use crate::catalog::{Catalog, JourneyStep};
use crate::enrichment::{fallback, Enricher};
use crate::error::{CoreError, Result, ValidationError};
use crate::insight::{fallback_outcome, InsightOutcome, InsightTrigger};
use crate::journey::{JourneyMachine, StepOutcome};
use crate::model::{
    next_entry_id, CheckInInput, DashboardComponent, JournalEntry, Session, UserDocument,
};
use crate::storage::{Config, DocumentStore};
use crate::streak::{CheckInReward, StreakCalculator};
use crate::sync::{Connectivity, DrainOutcome, Fetch, SyncQueue, SyncStatus};

/// Days of history covered by the monthly report.
const REPORT_DAYS: u64 = 30;

/// Value of a command plus any save failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome<T> {
    pub value: T,
    /// Set when the state advanced but could not be saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_warning: Option<String>,
}

impl<T> CommandOutcome<T> {
    pub fn is_persisted(&self) -> bool {
        self.persist_warning.is_none()
    }
}

/// A recorded check-in and whatever it unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckInResult {
    pub reward: CheckInReward,
    pub unlocks: Unlocks,
}

/// A written journal entry and its side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalAdded {
    pub entry: JournalEntry,
    pub unlocks: Unlocks,
    /// Present when the entry was marked as a journey step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepOutcome>,
}

/// Result of fetching the reflection for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReflectionStatus {
    /// Reflection stored on the entry.
    Stored { entry: JournalEntry },
    /// The request failed or we are offline; the entry stays queued.
    Pending { message: String },
    /// A fetch for this entry is already outstanding.
    InFlight,
    /// The entry already has its reflection.
    NotPending,
}

/// Owns the user document and serializes all mutations.
pub struct StateContainer<S: DocumentStore> {
    store: S,
    key: String,
    catalog: Catalog,
    config: Config,
    connectivity: Connectivity,
    sync: SyncQueue,
    insight: InsightTrigger,
    doc: Mutex<UserDocument>,
}

impl<S: DocumentStore> StateContainer<S> {
    /// Load the document (or start from the default one) and build the
    /// container. Draining the sync queue is left to the caller.
    ///
    /// # Errors
    /// `Persist` if a stored document exists but cannot be read.
    pub fn open(
        store: S,
        catalog: Catalog,
        config: Config,
        connectivity: Connectivity,
    ) -> Result<Self> {
        let key = config.storage.document_key.clone();
        let mut doc: UserDocument = store.load(&key, UserDocument::default())?;
        if let Some(journey) = JourneyMachine::new(&catalog, &config.rewards).retire_unknown(&mut doc) {
            tracing::warn!(journey = %journey, "active journey is not in the catalog, cleared");
        }
        tracing::debug!(
            key = %key,
            journal = doc.journal.len(),
            check_ins = doc.check_ins.len(),
            "user document loaded"
        );
        let insight = InsightTrigger::new(config.insights.clone());
        Ok(Self {
            store,
            key,
            catalog,
            config,
            connectivity,
            sync: SyncQueue::new(),
            insight,
            doc: Mutex::new(doc),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn doc(&self) -> MutexGuard<'_, UserDocument> {
        self.doc.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current document.
    pub fn snapshot(&self) -> UserDocument {
        self.doc().clone()
    }

    fn persist(&self, doc: &UserDocument) -> Option<String> {
        match self.store.save(&self.key, doc) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to save user document");
                Some(e.to_string())
            }
        }
    }

    /// Run `f` on a working copy; commit and save only if it succeeds.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut UserDocument) -> Result<T>,
    ) -> Result<CommandOutcome<T>> {
        let mut doc = self.doc();
        let mut next = doc.clone();
        let value = f(&mut next)?;
        *doc = next;
        let persist_warning = self.persist(&doc);
        Ok(CommandOutcome {
            value,
            persist_warning,
        })
    }

    fn journeys(&self) -> JourneyMachine<'_> {
        JourneyMachine::new(&self.catalog, &self.config.rewards)
    }

    fn evaluator(&self) -> AchievementEvaluator {
        AchievementEvaluator::with_config(&self.config.rewards)
    }

    /// Record today's check-in.
    pub fn complete_check_in(&self, input: CheckInInput) -> Result<CommandOutcome<CheckInResult>> {
        self.complete_check_in_on(input, Local::now().date_naive())
    }

    /// Record a check-in for `today`, updating streak, points and the
    /// streak achievement.
    ///
    /// # Errors
    /// `Validation` or `AlreadyCheckedInToday`; the document is unchanged.
    pub fn complete_check_in_on(
        &self,
        input: CheckInInput,
        today: NaiveDate,
    ) -> Result<CommandOutcome<CheckInResult>> {
        let calculator = StreakCalculator::with_config(self.config.rewards.clone());
        let evaluator = self.evaluator();
        self.mutate(|doc| {
            let reward = calculator.apply_check_in(doc, input, today)?;
            let unlocks = evaluator.apply(
                doc,
                &AchievementEvent::StreakReached {
                    streak: reward.streak,
                },
            );
            Ok(CheckInResult { reward, unlocks })
        })
    }

    /// Write a journal entry. Online entries are queued for a reflection;
    /// offline ones are queued as unsynced. When `journey_step` is set the
    /// active journey step is completed afterwards; if that fails the entry
    /// is still kept and `step` is `None`.
    pub fn add_journal_entry(
        &self,
        content: &str,
        journey_step: bool,
    ) -> Result<CommandOutcome<JournalAdded>> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationError::Empty("content").into());
        }
        let online = self.connectivity.is_online();
        let evaluator = self.evaluator();
        let journeys = self.journeys();

        self.mutate(|doc| {
            let previous_count = doc.journal.len();
            let entry = JournalEntry::new(
                next_entry_id(&doc.journal, Utc::now()),
                Utc::now(),
                content.to_string(),
                online,
            );
            doc.journal.insert(0, entry.clone());
            tracing::debug!(entry = %entry.id, online, "journal entry added");

            let unlocks = evaluator.apply(doc, &AchievementEvent::JournalEntryAdded { previous_count });
            let step = if journey_step {
                match journeys.complete_current_step(doc) {
                    Ok(step) => Some(step),
                    Err(e) => {
                        tracing::warn!(entry = %entry.id, error = %e, "journey step not completed, entry kept");
                        None
                    }
                }
            } else {
                None
            };
            Ok(JournalAdded {
                entry,
                unlocks,
                step,
            })
        })
    }

    /// Replace the journal entry with the same id.
    ///
    /// # Errors
    /// `UnknownJournalEntry` if no entry has this id.
    pub fn update_journal_entry(&self, entry: JournalEntry) -> Result<CommandOutcome<()>> {
        self.mutate(|doc| {
            let id = entry.id.clone();
            if doc.replace_journal_entry(entry) {
                Ok(())
            } else {
                Err(CoreError::UnknownJournalEntry(id))
            }
        })
    }

    /// Store a finished guided session, newest first.
    pub fn add_session(&self, session: Session) -> Result<CommandOutcome<()>> {
        self.mutate(|doc| {
            tracing::debug!(session = %session.id, title = %session.title, "session stored");
            doc.sessions.insert(0, session);
            Ok(())
        })
    }

    pub fn start_journey(&self, journey_id: &str) -> Result<CommandOutcome<()>> {
        let journeys = self.journeys();
        self.mutate(|doc| journeys.start(doc, journey_id))
    }

    pub fn complete_journey_step(&self) -> Result<CommandOutcome<StepOutcome>> {
        let journeys = self.journeys();
        self.mutate(|doc| journeys.complete_current_step(doc))
    }

    /// Definition of the active journey step, if any.
    pub fn current_step(&self) -> Result<Option<JourneyStep>> {
        let doc = self.doc();
        Ok(self.journeys().current_step(&doc)?.cloned())
    }

    /// Replace the dashboard component order.
    ///
    /// # Errors
    /// `Validation` for an empty layout or a repeated component.
    pub fn update_dashboard_layout(
        &self,
        layout: Vec<DashboardComponent>,
    ) -> Result<CommandOutcome<()>> {
        if layout.is_empty() {
            return Err(ValidationError::Empty("layout").into());
        }
        for (i, component) in layout.iter().enumerate() {
            if layout[..i].contains(component) {
                return Err(ValidationError::Duplicate(format!("{component:?}").to_lowercase()).into());
            }
        }
        self.mutate(|doc| {
            doc.dashboard_layout = layout;
            Ok(())
        })
    }

    pub fn sync_status(&self) -> SyncStatus {
        SyncStatus {
            pending_count: self.doc().pending_entries().count(),
            in_progress: self.sync.is_running(),
            online: self.connectivity.is_online(),
        }
    }

    /// Store a fetched reflection if the entry still exists and still needs
    /// one. Returns the stored entry.
    fn entry_pending(&self, id: &str) -> bool {
        self.doc().journal_entry(id).is_some_and(JournalEntry::is_pending)
    }

    fn store_reflection(&self, updated: JournalEntry, warning: &mut Option<String>) -> Option<JournalEntry> {
        let mut doc = self.doc();
        let still_pending = doc
            .journal_entry(&updated.id)
            .is_some_and(JournalEntry::is_pending);
        if !still_pending {
            tracing::debug!(entry = %updated.id, "entry changed during sync, dropping reflection");
            return None;
        }
        let reflection = updated.reflection.clone().unwrap_or_default();
        let current = doc.journal_entry(&updated.id)?.with_reflection(reflection);
        doc.replace_journal_entry(current.clone());
        if let Some(w) = self.persist(&doc) {
            *warning = Some(w);
        }
        Some(current)
    }

    /// Drain the offline queue through `enricher`.
    pub async fn process_sync_queue(&self, enricher: &dyn Enricher) -> CommandOutcome<DrainOutcome> {
        let mut persist_warning = None;
        if !self.connectivity.is_online() {
            tracing::debug!("offline, sync queue left as is");
            return CommandOutcome {
                value: DrainOutcome::Offline,
                persist_warning,
            };
        }
        let Some(run) = self.sync.begin() else {
            tracing::debug!("sync already running");
            return CommandOutcome {
                value: DrainOutcome::AlreadyRunning,
                persist_warning,
            };
        };

        let pending = SyncQueue::pending(&self.doc().journal);
        let value = run
            .process(pending, enricher, |id| self.entry_pending(id), |updated| {
                self.store_reflection(updated, &mut persist_warning).is_some()
            })
            .await;
        CommandOutcome {
            value,
            persist_warning,
        }
    }

    /// Fetch the reflection for a single entry right away.
    ///
    /// # Errors
    /// `UnknownJournalEntry` if no entry has this id.
    pub async fn reflect_entry(
        &self,
        id: &str,
        enricher: &dyn Enricher,
    ) -> Result<CommandOutcome<ReflectionStatus>> {
        let entry = self
            .doc()
            .journal_entry(id)
            .cloned()
            .ok_or_else(|| CoreError::UnknownJournalEntry(id.to_string()))?;
        let mut persist_warning = None;
        let pending = || ReflectionStatus::Pending {
            message: fallback::REFLECTION_PENDING.to_string(),
        };

        let value = if !entry.is_pending() {
            ReflectionStatus::NotPending
        } else if !self.connectivity.is_online() {
            pending()
        } else {
            match self.sync.reflect(&entry, enricher, |id| self.entry_pending(id)).await {
                Fetch::InFlight => ReflectionStatus::InFlight,
                Fetch::Settled => ReflectionStatus::NotPending,
                Fetch::Fetched(Ok(reflection)) if !reflection.trim().is_empty() => {
                    match self.store_reflection(entry.with_reflection(reflection), &mut persist_warning) {
                        Some(entry) => ReflectionStatus::Stored { entry },
                        None => ReflectionStatus::NotPending,
                    }
                }
                Fetch::Fetched(Ok(_)) => pending(),
                Fetch::Fetched(Err(e)) => {
                    tracing::warn!(entry = %id, error = %e, "reflection unavailable, entry stays queued");
                    pending()
                }
            }
        };
        Ok(CommandOutcome {
            value,
            persist_warning,
        })
    }

    /// Update connectivity; going from offline to online drains the queue.
    pub async fn set_online(
        &self,
        online: bool,
        enricher: &dyn Enricher,
    ) -> Option<CommandOutcome<DrainOutcome>> {
        if self.connectivity.set_online(online) {
            tracing::info!("back online, draining sync queue");
            Some(self.process_sync_queue(enricher).await)
        } else {
            None
        }
    }

    pub async fn refresh_daily_insight(
        &self,
        enricher: &dyn Enricher,
    ) -> CommandOutcome<InsightOutcome> {
        self.refresh_daily_insight_on(enricher, Local::now().date_naive()).await
    }

    /// Generate and store today's insight when one is due.
    pub async fn refresh_daily_insight_on(
        &self,
        enricher: &dyn Enricher,
        today: NaiveDate,
    ) -> CommandOutcome<InsightOutcome> {
        let done = |value| CommandOutcome {
            value,
            persist_warning: None,
        };
        let Some(run) = self.insight.begin() else {
            return done(InsightOutcome::AlreadyRunning);
        };
        let inputs = {
            let doc = self.doc();
            if !self.insight.is_due(&doc, today) {
                return done(InsightOutcome::NotDue);
            }
            self.insight.inputs(&doc)
        };
        if !self.connectivity.is_online() {
            return done(fallback_outcome());
        }

        let Some(text) = run.fetch(&inputs, enricher).await else {
            return done(fallback_outcome());
        };
        let mut doc = self.doc();
        self.insight.record(&mut doc, text.clone(), today);
        tracing::info!(%today, "daily insight stored");
        CommandOutcome {
            value: InsightOutcome::Generated(text),
            persist_warning: self.persist(&doc),
        }
    }

    /// Journal prompt for the latest check-in, or the generic prompt.
    pub async fn journal_prompt(&self, enricher: &dyn Enricher) -> String {
        let latest = self.doc().check_ins.first().cloned();
        let Some(latest) = latest.filter(|_| self.connectivity.is_online()) else {
            return fallback::JOURNAL_PROMPT.to_string();
        };
        match enricher.journal_prompt(&latest).await {
            Ok(prompt) if !prompt.trim().is_empty() => prompt.trim().to_string(),
            Ok(_) => fallback::JOURNAL_PROMPT.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "journal prompt unavailable, using fallback");
                fallback::JOURNAL_PROMPT.to_string()
            }
        }
    }

    /// Paragraph summarizing the last 30 days of check-ins and journal themes.
    pub async fn monthly_report(&self, enricher: &dyn Enricher, today: NaiveDate) -> String {
        let since = today.checked_sub_days(Days::new(REPORT_DAYS)).unwrap_or(NaiveDate::MIN);
        let (check_ins, themes) = {
            let doc = self.doc();
            let check_ins: Vec<_> = doc
                .check_ins
                .iter()
                .filter(|c| c.date > since)
                .cloned()
                .collect();
            let themes: Vec<_> = doc
                .journal
                .iter()
                .filter(|e| e.date.date_naive() > since)
                .map(|e| e.content.clone())
                .collect();
            (check_ins, themes)
        };
        if check_ins.is_empty() || !self.connectivity.is_online() {
            return fallback::MONTHLY_REPORT.to_string();
        }
        match enricher.monthly_report(&check_ins, &themes).await {
            Ok(report) if !report.trim().is_empty() => report.trim().to_string(),
            Ok(_) => fallback::MONTHLY_REPORT.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "monthly report unavailable, using fallback");
                fallback::MONTHLY_REPORT.to_string()
            }
        }
    }
}
