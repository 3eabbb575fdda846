//! Core error types for focuslog-core.
//!
//! Timer and log failures are local and synchronous. Collaborator failures
//! (webhook, language model) have their own enums so the shell can tell them
//! apart and never confuse them with timer or log state.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focuslog-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A session duration was zero or negative.
    #[error("Invalid duration: {0} minutes (must be positive)")]
    InvalidDuration(i64),

    /// The persistent store could not be opened, written or read.
    #[error("Storage unavailable: {source}")]
    StorageUnavailable {
        #[from]
        source: rusqlite::Error,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Webhook delivery errors
    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    /// Language-model errors
    #[error("Mentor error: {0}")]
    Llm(#[from] LlmError),

    /// A report was requested but the log holds no entries.
    #[error("The activity log is empty; nothing to analyze yet")]
    EmptyLog,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Could not determine where configuration lives
    #[error("Could not resolve data directory: {0}")]
    DataDir(String),
}

/// Webhook delivery errors.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("webhook is disabled or has no URL configured")]
    NotConfigured,

    #[error("invalid webhook URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
}

/// Errors from the hosted chat-completion endpoint.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API key not found in environment variable {0}")]
    MissingApiKey(String),
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("empty response: no choices returned")]
    EmptyResponse,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
