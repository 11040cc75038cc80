pub mod checkin;
pub mod config;
pub mod insight;
pub mod journal;
pub mod journey;
pub mod layout;
pub mod session;
pub mod status;

use std::future::Future;

use async_trait::async_trait;
use innerbloom_core::enrichment::SessionSummary;
use innerbloom_core::model::{CheckIn, ConversationTurn};
use innerbloom_core::storage::StorageBackend;
use innerbloom_core::{
    Catalog, CommandOutcome, Config, Connectivity, DocumentStore, DrainOutcome, Enricher,
    EnrichmentError, GeminiClient, JournalEntry, JsonFileStore, SqliteStore, StateContainer,
    StoreError,
};
use serde::Serialize;
use tokio::runtime::Runtime;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Store selected by `storage.backend`.
pub enum AppStore {
    Json(JsonFileStore),
    Sqlite(SqliteStore),
}

impl DocumentStore for AppStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            AppStore::Json(store) => store.read(key),
            AppStore::Sqlite(store) => store.read(key),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            AppStore::Json(store) => store.write(key, value),
            AppStore::Sqlite(store) => store.write(key, value),
        }
    }
}

/// Stand-in when no API key is configured; every call is unavailable.
struct Disabled;

fn disabled() -> EnrichmentError {
    EnrichmentError::Unavailable("no API key configured".into())
}

#[async_trait]
impl Enricher for Disabled {
    async fn journal_reflection(&self, _text: &str) -> Result<String, EnrichmentError> {
        Err(disabled())
    }

    async fn daily_insight(
        &self,
        _check_ins: &[CheckIn],
        _entries: &[JournalEntry],
    ) -> Result<String, EnrichmentError> {
        Err(disabled())
    }

    async fn journal_prompt(&self, _latest: &CheckIn) -> Result<String, EnrichmentError> {
        Err(disabled())
    }

    async fn session_summary(
        &self,
        _conversation: &[ConversationTurn],
    ) -> Result<SessionSummary, EnrichmentError> {
        Err(disabled())
    }

    async fn monthly_report(
        &self,
        _check_ins: &[CheckIn],
        _themes: &[String],
    ) -> Result<String, EnrichmentError> {
        Err(disabled())
    }
}

/// Opened state, enrichment client and the runtime for async commands.
pub struct App {
    pub state: StateContainer<AppStore>,
    pub gemini: Option<GeminiClient>,
    runtime: Runtime,
}

impl App {
    /// Open the configured store and drain any queued journal entries.
    pub fn open(offline: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load_or_default();
        let store = match config.storage.backend {
            StorageBackend::Json => AppStore::Json(JsonFileStore::open()?),
            StorageBackend::Sqlite => AppStore::Sqlite(SqliteStore::open()?),
        };
        let gemini = match GeminiClient::from_config(&config.enrichment) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::info!(error = %e, "enrichment disabled");
                None
            }
        };
        let state = StateContainer::open(store, Catalog::builtin(), config, Connectivity::new(!offline))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let app = Self {
            state,
            gemini,
            runtime,
        };
        app.drain_on_start();
        Ok(app)
    }

    pub fn enricher(&self) -> &dyn Enricher {
        match &self.gemini {
            Some(client) => client,
            None => &Disabled,
        }
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn drain_on_start(&self) {
        if self.gemini.is_none() || self.state.sync_status().pending_count == 0 {
            return;
        }
        let outcome = self.block_on(self.state.process_sync_queue(self.enricher()));
        warn_unsaved(&outcome);
        if let DrainOutcome::Completed(report) = &outcome.value {
            tracing::info!(synced = report.synced, failed = report.failed, "startup sync");
        }
    }
}

/// Report a save failure on stderr.
pub fn warn_unsaved<T>(outcome: &CommandOutcome<T>) {
    if let Some(warning) = &outcome.persist_warning {
        eprintln!("warning: changes were not saved: {warning}");
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a command's value, warning on stderr if it was not saved.
pub fn print_outcome<T: Serialize>(outcome: &CommandOutcome<T>) -> CliResult {
    warn_unsaved(outcome);
    print_json(&outcome.value)
}
