use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every timer transition and every logged session produces an Event.
/// The shell prints them; integrations react to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        duration_minutes: i64,
        deadline: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    TimerStopped {
        /// Whether a session was actually running when stop was requested.
        was_running: bool,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        duration_minutes: i64,
        deadline: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    TimerStatus {
        running: bool,
        remaining_secs: Option<i64>,
        remaining: Option<String>,
        deadline: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
    EntryLogged {
        id: i64,
        duration_minutes: i64,
        at: DateTime<Utc>,
    },
}
