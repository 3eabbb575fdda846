//! Completion notifications.
//!
//! Delivery is fire-and-forget: a failing notifier is logged and otherwise
//! ignored, so it can never leave the timer or the log half-updated.

use std::io::Write;

use crate::storage::NotificationsConfig;

/// Something that can put a message in front of the user.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), Box<dyn std::error::Error>>;
}

/// Writes the notification to stderr, optionally ringing the terminal bell.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier {
    pub bell: bool,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut err = std::io::stderr().lock();
        if self.bell {
            write!(err, "\x07")?;
        }
        writeln!(err, "[{title}] {message}")?;
        err.flush()?;
        Ok(())
    }
}

/// Used when notifications are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _title: &str, _message: &str) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

/// Pick the notifier the configuration asks for.
pub fn from_config(config: &NotificationsConfig) -> Box<dyn Notifier> {
    if config.enabled {
        Box::new(ConsoleNotifier { bell: config.bell })
    } else {
        Box::new(NoopNotifier)
    }
}

/// Deliver a notification, logging instead of propagating any failure.
///
/// Returns whether delivery succeeded.
pub fn notify_best_effort(notifier: &dyn Notifier, title: &str, message: &str) -> bool {
    match notifier.notify(title, message) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("notification not delivered: {e}");
            false
        }
    }
}

/// Title and body for a completed session.
pub fn completion_message(duration_minutes: i64) -> (&'static str, String) {
    (
        "Session complete",
        format!("Your {duration_minutes} minute focus session is finished. Time to log it!"),
    )
}
