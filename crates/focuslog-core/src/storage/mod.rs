mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, MentorConfig, NotificationsConfig, TimerConfig, WebhookConfig};
pub use database::{ActivityLog, CategoryMinutes, LogEntry, LogStats, NewEntry};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the directory holding `focuslog.db` and `config.toml`.
///
/// `FOCUSLOG_DATA_DIR` wins when set. Otherwise `~/.config/focuslog[-dev]/`,
/// where FOCUSLOG_ENV=dev selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FOCUSLOG_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSLOG_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focuslog-dev")
            } else {
                base_dir.join("focuslog")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
