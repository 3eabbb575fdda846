//! SQLite-backed activity log.
//!
//! Provides persistent storage for:
//! - Completed focus sessions (append-only, never updated or deleted)
//! - Aggregate statistics over the log
//! - Key-value store for shell state (e.g. the persisted timer)

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

use super::{data_dir, migrations};
use crate::error::{CoreError, Result};

const SELECT_ENTRY: &str = "SELECT id, created_at, planned_task, outcome_notes, interruptions,
        duration_minutes, category
     FROM logs";

/// One completed session as stored in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub planned_task: String,
    pub outcome_notes: String,
    pub interruptions: String,
    pub duration_minutes: i64,
    /// `None` means uncategorized.
    pub category: Option<String>,
}

impl LogEntry {
    pub fn was_interrupted(&self) -> bool {
        !self.interruptions.trim().is_empty()
    }
}

/// Client-supplied fields of a log entry. The store assigns the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub planned_task: String,
    pub outcome_notes: String,
    pub interruptions: String,
    pub duration_minutes: i64,
    pub category: Option<String>,
}

impl NewEntry {
    pub fn new(duration_minutes: i64) -> Self {
        Self {
            duration_minutes,
            ..Self::default()
        }
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.planned_task = task.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.outcome_notes = notes.into();
        self
    }

    pub fn with_interruptions(mut self, interruptions: impl Into<String>) -> Self {
        self.interruptions = interruptions.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Minutes logged under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMinutes {
    pub category: Option<String>,
    pub entries: u64,
    pub minutes: i64,
}

/// Aggregates over the whole log. Minute totals saturate at `i64::MAX`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStats {
    pub entries: u64,
    pub total_minutes: i64,
    pub interrupted_entries: u64,
    /// Sorted by category name; uncategorized first.
    pub by_category: Vec<CategoryMinutes>,
}

impl LogStats {
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        let mut by_category: BTreeMap<Option<String>, (u64, i64)> = BTreeMap::new();
        let mut stats = LogStats::default();

        for entry in entries {
            stats.entries += 1;
            stats.total_minutes = stats.total_minutes.saturating_add(entry.duration_minutes);
            if entry.was_interrupted() {
                stats.interrupted_entries += 1;
            }
            let slot = by_category.entry(entry.category.clone()).or_default();
            slot.0 += 1;
            slot.1 = slot.1.saturating_add(entry.duration_minutes);
        }

        stats.by_category = by_category
            .into_iter()
            .map(|(category, (entries, minutes))| CategoryMinutes {
                category,
                entries,
                minutes,
            })
            .collect();
        stats
    }
}

/// Append-only SQLite store of completed sessions.
pub struct ActivityLog {
    conn: Connection,
}

impl ActivityLog {
    /// Open the log at `<data dir>/focuslog.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns `Config(ConfigError::DataDir)` if the data directory cannot be
    /// resolved or created; the database itself was never reached. Returns
    /// `StorageUnavailable` if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("focuslog.db");
        Self::open_at(path)
    }

    /// Open (or create) the log at an explicit path.
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the file cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening activity log");
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory log (for tests and throwaway sessions).
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(2))?;
        migrations::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Record a completed session.
    ///
    /// # Errors
    /// Returns `InvalidDuration` (without touching the store) if
    /// `duration_minutes` is not positive, or `StorageUnavailable` if the
    /// insert fails.
    pub fn append(&self, entry: NewEntry) -> Result<LogEntry> {
        if entry.duration_minutes <= 0 {
            return Err(CoreError::InvalidDuration(entry.duration_minutes));
        }
        let category = entry
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let created_at = Utc::now();

        // Immediate: take the write lock up front so concurrent writers
        // serialize instead of interleaving id assignment.
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO logs (created_at, planned_task, outcome_notes, interruptions,
                               duration_minutes, category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                created_at.to_rfc3339(),
                entry.planned_task,
                entry.outcome_notes,
                entry.interruptions,
                entry.duration_minutes,
                category,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(id, duration_minutes = entry.duration_minutes, "session logged");
        Ok(LogEntry {
            id,
            created_at,
            planned_task: entry.planned_task,
            outcome_notes: entry.outcome_notes,
            interruptions: entry.interruptions,
            duration_minutes: entry.duration_minutes,
            category,
        })
    }

    /// The `n` most recently inserted entries, most recent first.
    pub fn recent(&self, n: usize) -> Result<Vec<LogEntry>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_ENTRY} ORDER BY id DESC LIMIT ?1"))?;
        let rows = stmt.query_map(params![limit], row_to_entry)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Every entry, in insertion order.
    pub fn all(&self) -> Result<Vec<LogEntry>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_ENTRY} ORDER BY id ASC"))?;
        let rows = stmt.query_map([], row_to_entry)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Distinct non-empty planned tasks, most recently used first.
    pub fn recent_tasks(&self, limit: usize) -> Result<Vec<String>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT planned_task, MAX(id) AS last_id
             FROM logs
             WHERE TRIM(planned_task) <> ''
             GROUP BY planned_task
             ORDER BY last_id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Distinct categories in use, alphabetical.
    pub fn categories(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT category FROM logs
             WHERE category IS NOT NULL
             ORDER BY category",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn stats(&self) -> Result<LogStats> {
        Ok(LogStats::from_entries(&self.all()?))
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key from the kv store. Missing keys are ignored.
    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<LogEntry> {
    let created_at: String = row.get(1)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;
    Ok(LogEntry {
        id: row.get(0)?,
        created_at,
        planned_task: row.get(2)?,
        outcome_notes: row.get(3)?,
        interruptions: row.get(4)?,
        duration_minutes: row.get(5)?,
        category: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_id_and_timestamp() {
        let log = ActivityLog::open_memory().unwrap();
        let before = Utc::now();
        let entry = log
            .append(
                NewEntry::new(25)
                    .with_task("Write report")
                    .with_notes("Draft done"),
            )
            .unwrap();
        assert_eq!(entry.id, 1);
        assert!(entry.created_at >= before);
        assert_eq!(entry.category, None);

        let stored = log.recent(1).unwrap();
        assert_eq!(stored, vec![entry]);
    }

    #[test]
    fn append_rejects_non_positive_duration() {
        let log = ActivityLog::open_memory().unwrap();
        for bad in [0, -1, -25] {
            let err = log.append(NewEntry::new(bad).with_task("x")).unwrap_err();
            assert!(matches!(err, CoreError::InvalidDuration(d) if d == bad));
        }
        assert!(log.all().unwrap().is_empty());
    }

    #[test]
    fn recent_orders_by_recency() {
        let log = ActivityLog::open_memory().unwrap();
        for minutes in [25, 10, 50] {
            log.append(NewEntry::new(minutes)).unwrap();
        }

        let minutes: Vec<i64> = log
            .recent(2)
            .unwrap()
            .iter()
            .map(|e| e.duration_minutes)
            .collect();
        assert_eq!(minutes, vec![50, 10]);

        assert!(log.recent(0).unwrap().is_empty());
        let ids: Vec<i64> = log.recent(100).unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn all_returns_every_entry() {
        let log = ActivityLog::open_memory().unwrap();
        for minutes in [25, 10, 50] {
            log.append(NewEntry::new(minutes)).unwrap();
        }
        let all = log.all().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all.iter().map(|e| e.duration_minutes).sum::<i64>(), 85);
    }

    #[test]
    fn blank_category_is_uncategorized() {
        let log = ActivityLog::open_memory().unwrap();
        let entry = log.append(NewEntry::new(5).with_category("   ")).unwrap();
        assert_eq!(entry.category, None);
        let entry = log.append(NewEntry::new(5).with_category(" Study ")).unwrap();
        assert_eq!(entry.category.as_deref(), Some("Study"));
        assert_eq!(log.categories().unwrap(), vec!["Study".to_string()]);
    }

    #[test]
    fn recent_tasks_are_distinct_and_recency_ordered() {
        let log = ActivityLog::open_memory().unwrap();
        for task in ["Email", "Report", "", "Email", "Review"] {
            log.append(NewEntry::new(25).with_task(task)).unwrap();
        }
        assert_eq!(
            log.recent_tasks(10).unwrap(),
            vec!["Review".to_string(), "Email".to_string(), "Report".to_string()]
        );
        assert_eq!(log.recent_tasks(1).unwrap(), vec!["Review".to_string()]);
        assert!(log.recent_tasks(0).unwrap().is_empty());
    }

    #[test]
    fn stats_group_by_category() {
        let log = ActivityLog::open_memory().unwrap();
        log.append(NewEntry::new(25).with_category("Work")).unwrap();
        log.append(NewEntry::new(10).with_interruptions("phone call"))
            .unwrap();
        log.append(NewEntry::new(50).with_category("Work")).unwrap();

        let stats = log.stats().unwrap();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.total_minutes, 85);
        assert_eq!(stats.interrupted_entries, 1);
        assert_eq!(
            stats.by_category,
            vec![
                CategoryMinutes {
                    category: None,
                    entries: 1,
                    minutes: 10,
                },
                CategoryMinutes {
                    category: Some("Work".into()),
                    entries: 2,
                    minutes: 75,
                },
            ]
        );
    }

    #[test]
    fn stats_saturate_instead_of_overflowing() {
        let log = ActivityLog::open_memory().unwrap();
        log.append(NewEntry::new(i64::MAX).with_category("Work")).unwrap();
        log.append(NewEntry::new(1).with_category("Work")).unwrap();

        let stats = log.stats().unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.total_minutes, i64::MAX);
        assert_eq!(stats.by_category[0].minutes, i64::MAX);
    }

    #[test]
    fn kv_store() {
        let log = ActivityLog::open_memory().unwrap();
        assert!(log.kv_get("test").unwrap().is_none());
        log.kv_set("test", "hello").unwrap();
        assert_eq!(log.kv_get("test").unwrap().unwrap(), "hello");
        log.kv_set("test", "again").unwrap();
        assert_eq!(log.kv_get("test").unwrap().unwrap(), "again");
        log.kv_delete("test").unwrap();
        assert!(log.kv_get("test").unwrap().is_none());
        log.kv_delete("test").unwrap();
    }
}
