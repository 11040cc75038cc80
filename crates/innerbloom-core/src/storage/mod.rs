mod config;
pub mod store;

pub use config::{
    Config, EnrichmentConfig, InsightsConfig, RewardsConfig, StorageBackend, StorageConfig,
};
pub use store::{DocumentStore, JsonFileStore, MemoryStore, SqliteStore};

use std::path::PathBuf;

/// Returns `~/.config/innerbloom[-dev]/` based on INNERBLOOM_ENV.
///
/// Set INNERBLOOM_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("INNERBLOOM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("innerbloom-dev")
    } else {
        base_dir.join("innerbloom")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
