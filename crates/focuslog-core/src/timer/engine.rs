//! Deadline timer implementation.
//!
//! The timer is a wall-clock-based state machine. It does not use internal
//! threads and never sleeps - the caller is responsible for calling `poll()`
//! periodically (roughly once per second while running).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Idle
//!           |
//!           +-- poll() at/after deadline: emits Completed once, then Idle
//! ```
//!
//! Remaining time is always `deadline - now`. Nothing is decremented, so a
//! `TimerState` that was serialized, dropped and restored later still
//! completes at the original deadline.
//!
//! ## Usage
//!
//! ```ignore
//! let timer = SessionTimer::new();
//! let mut state = TimerState::default();
//! timer.start(&mut state, 25)?;
//! // On every tick:
//! match timer.poll(&mut state) {
//!     PollOutcome::Remaining(left) => render(left),
//!     PollOutcome::Completed { .. } => notify(),
//!     PollOutcome::NotRunning => {}
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use crate::error::{CoreError, Result};
use crate::events::Event;

/// State of one focus session, owned by the shell.
///
/// `active` implies `deadline` and `duration_minutes` are set; deserializing
/// a state that breaks this yields an idle state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredTimerState")]
pub struct TimerState {
    deadline: Option<DateTime<Utc>>,
    active: bool,
    /// Duration the running session was started with.
    duration_minutes: Option<i64>,
}

#[derive(Deserialize)]
struct StoredTimerState {
    #[serde(default)]
    deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    duration_minutes: Option<i64>,
}

impl From<StoredTimerState> for TimerState {
    fn from(stored: StoredTimerState) -> Self {
        match (stored.active, stored.deadline, stored.duration_minutes) {
            (true, Some(deadline), Some(minutes)) if minutes > 0 => Self {
                deadline: Some(deadline),
                active: true,
                duration_minutes: Some(minutes),
            },
            _ => Self::default(),
        }
    }
}

impl TimerState {
    pub fn is_running(&self) -> bool {
        self.active
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn duration_minutes(&self) -> Option<i64> {
        self.duration_minutes
    }

    fn clear(&mut self) {
        self.active = false;
        self.deadline = None;
        self.duration_minutes = None;
    }
}

/// Result of a single `poll()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    NotRunning,
    /// Strictly positive time left until the deadline.
    Remaining(Duration),
    /// The deadline passed. Returned exactly once per running session.
    Completed {
        duration_minutes: i64,
        deadline: DateTime<Utc>,
    },
}

impl PollOutcome {
    /// Convert to the event the shell reports for this poll.
    pub fn to_event(&self, state: &TimerState, at: DateTime<Utc>) -> Event {
        match *self {
            PollOutcome::Completed {
                duration_minutes,
                deadline,
            } => Event::TimerCompleted {
                duration_minutes,
                deadline,
                at,
            },
            PollOutcome::Remaining(left) => Event::TimerStatus {
                running: true,
                remaining_secs: Some(left.num_seconds()),
                remaining: Some(format_remaining(left)),
                deadline: state.deadline(),
                at,
            },
            PollOutcome::NotRunning => Event::TimerStatus {
                running: false,
                remaining_secs: None,
                remaining: None,
                deadline: None,
                at,
            },
        }
    }
}

/// Absolute-deadline timer.
///
/// Holds only a clock; all session state lives in the `TimerState` passed
/// to each call.
#[derive(Debug, Clone, Default)]
pub struct SessionTimer<C = SystemClock> {
    clock: C,
}

impl SessionTimer<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> SessionTimer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a session of `duration_minutes`, replacing any running one.
    ///
    /// # Errors
    /// Returns `InvalidDuration` if the duration is not positive or the
    /// deadline would fall outside the representable range.
    pub fn start(&self, state: &mut TimerState, duration_minutes: i64) -> Result<Event> {
        if duration_minutes <= 0 {
            return Err(CoreError::InvalidDuration(duration_minutes));
        }
        let now = self.clock.now();
        let deadline = Duration::try_minutes(duration_minutes)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or(CoreError::InvalidDuration(duration_minutes))?;

        if state.active {
            tracing::debug!(old_deadline = ?state.deadline, "replacing running session");
        }
        state.deadline = Some(deadline);
        state.active = true;
        state.duration_minutes = Some(duration_minutes);
        tracing::debug!(duration_minutes, %deadline, "timer started");

        Ok(Event::TimerStarted {
            duration_minutes,
            deadline,
            at: now,
        })
    }

    /// Return to Idle. Calling it while Idle changes nothing.
    pub fn stop(&self, state: &mut TimerState) -> Event {
        let was_running = state.active;
        state.clear();
        if was_running {
            tracing::debug!("timer stopped");
        }
        Event::TimerStopped {
            was_running,
            at: self.clock.now(),
        }
    }

    /// Report remaining time, or complete the session if its deadline passed.
    ///
    /// Never blocks. The transition to Idle happens in the same call that
    /// returns `Completed`, so a later poll cannot complete it again.
    pub fn poll(&self, state: &mut TimerState) -> PollOutcome {
        let (deadline, duration_minutes) =
            match (state.active, state.deadline, state.duration_minutes) {
                (true, Some(deadline), Some(minutes)) => (deadline, minutes),
                _ => return PollOutcome::NotRunning,
            };

        let now = self.clock.now();
        if now < deadline {
            return PollOutcome::Remaining(deadline - now);
        }

        state.clear();
        tracing::debug!(duration_minutes, %deadline, "timer completed");
        PollOutcome::Completed {
            duration_minutes,
            deadline,
        }
    }
}

/// Render a remaining duration as `MM:SS`, rounding partial seconds up.
///
/// Minutes are not wrapped into hours, so a 90 minute session shows `90:00`.
pub fn format_remaining(remaining: Duration) -> String {
    let ms = remaining.num_milliseconds().max(0);
    let secs = (ms + 999) / 1000;
    let (mins, secs) = (secs / 60, secs % 60);
    format!("{mins:02}:{secs:02}")
}
