//! End-to-end session flows: timer, notification, log.

use chrono::Duration;
use focuslog_core::notify::{notify_best_effort, Notifier};
use focuslog_core::timer::format_remaining;
use focuslog_core::{
    ActivityLog, ConfigError, CoreError, ManualClock, NewEntry, PollOutcome, SessionTimer,
    TimerState,
};

const TIMER_KEY: &str = "timer_state";

struct DeniedNotifier;

impl Notifier for DeniedNotifier {
    fn notify(&self, _: &str, _: &str) -> Result<(), Box<dyn std::error::Error>> {
        Err("notification permission denied".into())
    }
}

#[test]
fn test_focus_session_to_log_entry() {
    let timer = SessionTimer::with_clock(ManualClock::default());
    let log = ActivityLog::open_memory().unwrap();
    let mut state = TimerState::default();

    timer.start(&mut state, 25).unwrap();
    match timer.poll(&mut state) {
        PollOutcome::Remaining(left) => assert_eq!(format_remaining(left), "25:00"),
        other => panic!("Expected Remaining, got {other:?}"),
    }

    timer.clock().advance(Duration::minutes(25));
    let duration = match timer.poll(&mut state) {
        PollOutcome::Completed {
            duration_minutes, ..
        } => duration_minutes,
        other => panic!("Expected Completed, got {other:?}"),
    };
    assert_eq!(timer.poll(&mut state), PollOutcome::NotRunning);

    let entry = log
        .append(
            NewEntry::new(duration)
                .with_task("Write report")
                .with_notes("Draft done")
                .with_interruptions(""),
        )
        .unwrap();

    let recent = log.recent(1).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0], entry);
    assert_eq!(recent[0].id, 1);
    assert_eq!(recent[0].planned_task, "Write report");
    assert_eq!(recent[0].outcome_notes, "Draft done");
    assert_eq!(recent[0].interruptions, "");
    assert_eq!(recent[0].duration_minutes, 25);
}

#[test]
fn test_aggregate_and_recent_window() {
    let log = ActivityLog::open_memory().unwrap();
    for minutes in [25, 10, 50] {
        log.append(NewEntry::new(minutes)).unwrap();
    }

    let total: i64 = log.all().unwrap().iter().map(|e| e.duration_minutes).sum();
    assert_eq!(total, 85);

    let recent: Vec<i64> = log
        .recent(2)
        .unwrap()
        .iter()
        .map(|e| e.duration_minutes)
        .collect();
    assert_eq!(recent, vec![50, 10]);
}

#[test]
fn test_invalid_duration_leaves_store_untouched() {
    let log = ActivityLog::open_memory().unwrap();
    log.append(NewEntry::new(25)).unwrap();

    assert!(matches!(
        log.append(NewEntry::new(0).with_task("nope")),
        Err(CoreError::InvalidDuration(0))
    ));
    assert_eq!(log.all().unwrap().len(), 1);

    // The next id continues from the last accepted row.
    assert_eq!(log.append(NewEntry::new(5)).unwrap().id, 2);
}

#[test]
fn test_entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focuslog.db");

    {
        let log = ActivityLog::open_at(&path).unwrap();
        log.append(NewEntry::new(25).with_task("Before restart").with_category("Work"))
            .unwrap();
    }

    let log = ActivityLog::open_at(&path).unwrap();
    let all = log.all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].planned_task, "Before restart");
    assert_eq!(all[0].category.as_deref(), Some("Work"));
    assert_eq!(log.append(NewEntry::new(10)).unwrap().id, 2);
}

#[test]
fn test_unopenable_store_is_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened as a database file.
    let result = ActivityLog::open_at(dir.path());
    assert!(matches!(result, Err(CoreError::StorageUnavailable { .. })));
}

#[test]
fn test_uncreatable_data_dir_is_reported_as_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();

    // Only this test reads FOCUSLOG_DATA_DIR in this binary.
    std::env::set_var("FOCUSLOG_DATA_DIR", blocker.join("data"));
    let result = ActivityLog::open();
    std::env::remove_var("FOCUSLOG_DATA_DIR");

    assert!(matches!(
        result,
        Err(CoreError::Config(ConfigError::DataDir(_)))
    ));
}

#[test]
fn test_timer_state_persists_through_kv_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focuslog.db");
    let timer = SessionTimer::with_clock(ManualClock::default());

    {
        let log = ActivityLog::open_at(&path).unwrap();
        let mut state = TimerState::default();
        timer.start(&mut state, 50).unwrap();
        log.kv_set(TIMER_KEY, &serde_json::to_string(&state).unwrap())
            .unwrap();
    }

    // A fresh process picks the session up again.
    timer.clock().advance(Duration::minutes(20));
    let log = ActivityLog::open_at(&path).unwrap();
    let json = log.kv_get(TIMER_KEY).unwrap().unwrap();
    let mut state: TimerState = serde_json::from_str(&json).unwrap();
    assert_eq!(
        timer.poll(&mut state),
        PollOutcome::Remaining(Duration::minutes(30))
    );

    timer.clock().advance(Duration::minutes(30));
    assert!(matches!(
        timer.poll(&mut state),
        PollOutcome::Completed {
            duration_minutes: 50,
            ..
        }
    ));
}

#[test]
fn test_failed_notification_does_not_disturb_state() {
    let timer = SessionTimer::with_clock(ManualClock::default());
    let log = ActivityLog::open_memory().unwrap();
    let mut state = TimerState::default();

    timer.start(&mut state, 5).unwrap();
    timer.clock().advance(Duration::minutes(5));
    let outcome = timer.poll(&mut state);
    assert!(matches!(outcome, PollOutcome::Completed { .. }));

    assert!(!notify_best_effort(&DeniedNotifier, "Session complete", "done"));
    assert!(!state.is_running());
    assert_eq!(timer.poll(&mut state), PollOutcome::NotRunning);

    log.append(NewEntry::new(5)).unwrap();
    assert_eq!(log.all().unwrap().len(), 1);
}
