use std::time::Duration as StdDuration;

use chrono::Utc;
use clap::Subcommand;
use focuslog_core::notify::{self, completion_message, notify_best_effort};
use focuslog_core::timer::format_remaining;
use focuslog_core::{ActivityLog, Config, CoreError, PollOutcome, SessionTimer, TimerState};

use super::{print_json, CmdResult};

const TIMER_KEY: &str = "timer_state";
/// Duration of the last completed session, used to prefill `log add`.
pub const LAST_COMPLETED_KEY: &str = "last_completed_minutes";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a focus session
    Start {
        /// Session length in minutes (defaults to timer.default_minutes)
        #[arg(long, short)]
        minutes: Option<i64>,
    },
    /// Stop the running session without completing it
    Stop,
    /// Poll once and print the timer state as JSON
    Status,
    /// Poll every second until the running session completes
    Watch {
        /// Poll interval in milliseconds
        #[arg(long, default_value = "1000", hide = true)]
        interval_ms: u64,
    },
}

/// Read the persisted timer state.
///
/// Storage errors propagate. Unreadable JSON is discarded and treated as idle.
fn load_state(log: &ActivityLog) -> Result<TimerState, CoreError> {
    let Some(json) = log.kv_get(TIMER_KEY)? else {
        return Ok(TimerState::default());
    };
    Ok(parse_state(&json))
}

fn parse_state(json: &str) -> TimerState {
    serde_json::from_str(json).unwrap_or_else(|e| {
        tracing::warn!("discarding unreadable timer state: {e}");
        TimerState::default()
    })
}

fn save_state(log: &ActivityLog, state: &TimerState) -> CmdResult {
    let json = serde_json::to_string(state)?;
    log.kv_set(TIMER_KEY, &json)?;
    Ok(())
}

/// Notify and remember the duration once a session completes.
fn on_completed(log: &ActivityLog, config: &Config, duration_minutes: i64) -> CmdResult {
    log.kv_set(LAST_COMPLETED_KEY, &duration_minutes.to_string())?;
    let notifier = notify::from_config(&config.notifications);
    let (title, message) = completion_message(duration_minutes);
    notify_best_effort(notifier.as_ref(), title, &message);
    Ok(())
}

pub async fn run(action: TimerAction) -> CmdResult {
    let log = ActivityLog::open()?;
    let config = Config::load_or_default();
    let timer = SessionTimer::new();
    let mut state = load_state(&log)?;

    match action {
        TimerAction::Start { minutes } => {
            let minutes = minutes.unwrap_or(config.timer.default_minutes);
            if !config.timer.choices.contains(&minutes) {
                tracing::debug!(minutes, "starting with a duration outside timer.choices");
            }
            let event = timer.start(&mut state, minutes)?;
            save_state(&log, &state)?;
            print_json(&event)?;
        }
        TimerAction::Stop => {
            let event = timer.stop(&mut state);
            save_state(&log, &state)?;
            print_json(&event)?;
        }
        TimerAction::Status => {
            let outcome = timer.poll(&mut state);
            if let PollOutcome::Completed {
                duration_minutes, ..
            } = outcome
            {
                save_state(&log, &state)?;
                on_completed(&log, &config, duration_minutes)?;
            }
            print_json(&outcome.to_event(&state, Utc::now()))?;
        }
        TimerAction::Watch { interval_ms } => {
            let mut interval =
                tokio::time::interval(StdDuration::from_millis(interval_ms.max(1)));
            loop {
                interval.tick().await;
                // Another invocation may have stopped the session meanwhile.
                state = load_state(&log)?;
                match timer.poll(&mut state) {
                    PollOutcome::Remaining(left) => {
                        eprint!("\r{}", format_remaining(left));
                    }
                    outcome @ PollOutcome::Completed {
                        duration_minutes, ..
                    } => {
                        eprintln!();
                        save_state(&log, &state)?;
                        on_completed(&log, &config, duration_minutes)?;
                        print_json(&outcome.to_event(&state, Utc::now()))?;
                        break;
                    }
                    outcome @ PollOutcome::NotRunning => {
                        print_json(&outcome.to_event(&state, Utc::now()))?;
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}
