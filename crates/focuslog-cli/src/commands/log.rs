use clap::Subcommand;
use focuslog_core::{
    ActivityLog, Config, CoreError, DeliveryResult, Event, LogEntry, NewEntry, WebhookClient,
};
use serde::Serialize;

use super::timer::LAST_COMPLETED_KEY;
use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum LogAction {
    /// Record a completed session
    Add {
        /// What you planned to work on
        #[arg(long, short, default_value = "")]
        task: String,
        /// What actually happened
        #[arg(long, short, default_value = "")]
        notes: String,
        /// Interruptions during the session (empty = none)
        #[arg(long, short, default_value = "")]
        interruptions: String,
        /// Session length; defaults to the last completed timer, then timer.default_minutes
        #[arg(long, short)]
        minutes: Option<i64>,
        /// Optional category
        #[arg(long, short)]
        category: Option<String>,
        /// Skip the webhook even if it is enabled
        #[arg(long)]
        no_webhook: bool,
    },
    /// Most recent entries, newest first
    Recent {
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },
    /// Every entry in insertion order
    All,
    /// Distinct recently planned tasks
    Tasks {
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    /// Categories in use
    Categories,
}

#[derive(Serialize)]
struct Logged {
    #[serde(flatten)]
    event: Event,
    entry: LogEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook: Option<DeliveryResult>,
}

/// `--minutes`, else the last completed timer, else the configured default.
fn resolve_minutes(
    log: &ActivityLog,
    config: &Config,
    minutes: Option<i64>,
) -> Result<i64, CoreError> {
    if let Some(minutes) = minutes {
        return Ok(minutes);
    }
    let last_completed = log
        .kv_get(LAST_COMPLETED_KEY)?
        .and_then(|v| v.trim().parse().ok());
    Ok(last_completed.unwrap_or(config.timer.default_minutes))
}

async fn deliver(config: &Config, entry: &LogEntry) -> Option<DeliveryResult> {
    if !config.webhook.enabled {
        return None;
    }
    let result = match WebhookClient::from_config(&config.webhook) {
        Ok(client) => client.deliver_best_effort(entry).await,
        Err(e) => {
            tracing::warn!("webhook not configured correctly: {e}");
            DeliveryResult {
                success: false,
                status_code: None,
                error: Some(e.to_string()),
            }
        }
    };
    Some(result)
}

pub async fn run(action: LogAction) -> CmdResult {
    let log = ActivityLog::open()?;

    match action {
        LogAction::Add {
            task,
            notes,
            interruptions,
            minutes,
            category,
            no_webhook,
        } => {
            let config = Config::load_or_default();
            let mut new_entry = NewEntry::new(resolve_minutes(&log, &config, minutes)?)
                .with_task(task)
                .with_notes(notes)
                .with_interruptions(interruptions);
            if let Some(category) = category {
                new_entry = new_entry.with_category(category);
            }

            let entry = log.append(new_entry)?;
            log.kv_delete(LAST_COMPLETED_KEY)?;

            let webhook = if no_webhook {
                None
            } else {
                deliver(&config, &entry).await
            };
            let event = Event::EntryLogged {
                id: entry.id,
                duration_minutes: entry.duration_minutes,
                at: entry.created_at,
            };
            print_json(&Logged {
                event,
                entry,
                webhook,
            })?;
        }
        LogAction::Recent { count } => print_json(&log.recent(count)?)?,
        LogAction::All => print_json(&log.all()?)?,
        LogAction::Tasks { limit } => print_json(&log.recent_tasks(limit)?)?,
        LogAction::Categories => print_json(&log.categories()?)?,
    }
    Ok(())
}
