//! Prompt construction from log entries.
//!
//! Entries are rendered as a plain-text table, one row per entry, and cut
//! at a row boundary once the character budget is spent.

use super::client::ChatMessage;
use crate::error::{CoreError, Result};
use crate::storage::LogEntry;

const HEADER: &str = "id | logged_at | minutes | category | planned_task | outcome_notes | interruptions";

/// Render `entries` in the given order, within `max_chars`.
///
/// The header is always present. Rows that don't fit are replaced by a
/// single "omitted" line, and room for that line is reserved, so the result
/// never exceeds `max_chars` unless the budget is too small for the header
/// and the trailer alone.
pub fn summarize(entries: &[LogEntry], max_chars: usize) -> String {
    let rows: Vec<String> = entries.iter().map(render_row).collect();

    // Each row costs its length plus the newline before it.
    let mut len = HEADER.len();
    let mut kept = 0;
    while kept < rows.len() && len + 1 + rows[kept].len() <= max_chars {
        len += 1 + rows[kept].len();
        kept += 1;
    }
    while kept > 0
        && kept < rows.len()
        && len + 1 + omitted_line(rows.len() - kept).len() > max_chars
    {
        kept -= 1;
        len -= 1 + rows[kept].len();
    }

    let mut out = String::with_capacity(len);
    out.push_str(HEADER);
    for row in &rows[..kept] {
        out.push('\n');
        out.push_str(row);
    }
    if kept < rows.len() {
        out.push('\n');
        out.push_str(&omitted_line(rows.len() - kept));
    }
    out
}

fn omitted_line(omitted: usize) -> String {
    format!("... ({omitted} more entries omitted)")
}

fn render_row(entry: &LogEntry) -> String {
    format!(
        "{} | {} | {} | {} | {} | {} | {}",
        entry.id,
        entry.created_at.format("%Y-%m-%d %H:%M"),
        entry.duration_minutes,
        entry.category.as_deref().map(cell).unwrap_or_else(|| "-".into()),
        cell(&entry.planned_task),
        cell(&entry.outcome_notes),
        cell(&entry.interruptions),
    )
}

/// Keep a cell on one line and free of column separators.
fn cell(text: &str) -> String {
    let flat = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "/");
    if flat.is_empty() {
        "-".into()
    } else {
        flat
    }
}

/// Conversation for a free-form question, grounded in recent history.
///
/// `recent` is expected most recent first, as `ActivityLog::recent` returns.
pub fn mentor_messages(recent: &[LogEntry], question: &str, max_chars: usize) -> Vec<ChatMessage> {
    let history = if recent.is_empty() {
        "(no sessions logged yet)".to_string()
    } else {
        summarize(recent, max_chars)
    };
    vec![
        ChatMessage::system(format!(
            "You are a productivity mentor. Here is the user's recent history of focus sessions:\n{history}"
        )),
        ChatMessage::user(question.trim()),
    ]
}

/// Single-message request for a performance report over the whole log.
///
/// Newest entries are kept when the budget runs out.
///
/// # Errors
/// Returns `EmptyLog` when there is nothing to analyze.
pub fn report_messages(all: &[LogEntry], max_chars: usize) -> Result<Vec<ChatMessage>> {
    if all.is_empty() {
        return Err(CoreError::EmptyLog);
    }
    let mut newest_first = all.to_vec();
    newest_first.sort_by(|a, b| b.id.cmp(&a.id));

    let total = all
        .iter()
        .fold(0i64, |acc, e| acc.saturating_add(e.duration_minutes));
    let interrupted = all.iter().filter(|e| e.was_interrupted()).count();
    Ok(vec![ChatMessage::user(format!(
        "Analyze these productivity records and give detailed feedback. \
         Identify interruption patterns and suggest improvements.\n\
         Totals: {} sessions, {total} minutes, {interrupted} with interruptions.\n{}",
        all.len(),
        summarize(&newest_first, max_chars)
    ))])
}
