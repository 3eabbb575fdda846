//! # focuslog Core Library
//!
//! Core logic for a single-user focus timer and session journal. The
//! `focuslog` CLI is a thin shell over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: an absolute-deadline state machine. The caller owns the
//!   [`TimerState`] and periodically invokes [`SessionTimer::poll`]
//! - **Storage**: append-only SQLite activity log and TOML configuration
//! - **Notifications**: fire-and-forget completion notices
//! - **Integrations**: best-effort outbound webhook
//! - **Mentor**: chat-completion client and bounded log summaries
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: start/stop/poll over a [`TimerState`]
//! - [`ActivityLog`]: append, recent(n), all()
//! - [`Config`]: application configuration management
//! - [`WebhookClient`]: mirrors logged sessions to an HTTP endpoint
//! - [`LlmClient`]: asks the language model about the log

pub mod error;
pub mod events;
pub mod integrations;
pub mod mentor;
pub mod notify;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, LlmError, WebhookError};
pub use events::Event;
pub use integrations::{DeliveryResult, WebhookClient};
pub use mentor::LlmClient;
pub use notify::Notifier;
pub use storage::{ActivityLog, Config, LogEntry, LogStats, NewEntry};
pub use timer::{Clock, ManualClock, PollOutcome, SessionTimer, SystemClock, TimerState};
