//! # Inner Bloom Core Library
//!
//! This library holds the wellness state engine behind Inner Bloom: daily
//! check-ins and streaks, point rewards, achievements, multi-step guided
//! journeys and a journal whose AI reflections survive offline use. The
//! `innerbloom` CLI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **State container**: one persisted [`UserDocument`] owned by
//!   [`StateContainer`]; every command mutates, then saves
//! - **Engines**: pure streak, achievement and journey rules operating on the
//!   document
//! - **Storage**: JSON-file or SQLite key/value documents and TOML configuration
//! - **Enrichment**: the remote generative-language boundary ([`Enricher`]),
//!   with fallback text for display paths
//! - **Sync**: offline journal queue drained when connectivity returns
//!
//! ## Key Components
//!
//! - [`StateContainer`]: Commands over the user document
//! - [`Catalog`]: Journeys, achievements, meditations and breathing exercises
//! - [`Config`]: Application configuration management
//! - [`GeminiClient`]: HTTP implementation of [`Enricher`]

pub mod achievements;
pub mod catalog;
pub mod container;
pub mod enrichment;
pub mod error;
pub mod insight;
pub mod journey;
pub mod model;
pub mod storage;
pub mod streak;
pub mod sync;

#[cfg(test)]
mod testing;

pub use achievements::{AchievementEvaluator, AchievementEvent, Unlocks};
pub use catalog::Catalog;
pub use container::{CheckInResult, CommandOutcome, JournalAdded, ReflectionStatus, StateContainer};
pub use enrichment::{fallback, ChatSession, Enricher, GeminiClient, GuidedSession, SessionSummary};
pub use error::{CatalogError, ConfigError, CoreError, EnrichmentError, StoreError, ValidationError};
pub use insight::InsightOutcome;
pub use journey::{JourneyMachine, JourneyState, StepOutcome};
pub use model::{CheckIn, CheckInInput, DashboardComponent, JournalEntry, Session, UserDocument};
pub use storage::{Config, DocumentStore, JsonFileStore, MemoryStore, SqliteStore};
pub use streak::{CheckInReward, StreakCalculator};
pub use sync::{Connectivity, DrainOutcome, SyncReport, SyncStatus};
