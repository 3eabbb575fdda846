use chrono::Local;
use clap::Subcommand;
use focuslog_core::{ActivityLog, LogStats};

use super::{print_json, CmdResult};

#[derive(Subcommand, Default)]
pub enum StatsAction {
    /// All-time stats
    #[default]
    All,
    /// Sessions logged today (local time)
    Today,
}

pub fn run(action: StatsAction) -> CmdResult {
    let log = ActivityLog::open()?;

    match action {
        StatsAction::All => print_json(&log.stats()?)?,
        StatsAction::Today => {
            let today = Local::now().date_naive();
            let entries: Vec<_> = log
                .all()?
                .into_iter()
                .filter(|e| e.created_at.with_timezone(&Local).date_naive() == today)
                .collect();
            print_json(&LogStats::from_entries(&entries))?;
        }
    }
    Ok(())
}
