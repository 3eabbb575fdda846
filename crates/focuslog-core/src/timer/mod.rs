mod clock;
mod engine;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{format_remaining, PollOutcome, SessionTimer, TimerState};
