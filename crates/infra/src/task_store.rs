use botfleet_core::{ProfileId, RepositoryError, TaskKey, TaskKind, TaskRecord, TaskRepository};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TaskStoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<TaskStoreError> for RepositoryError {
    fn from(err: TaskStoreError) -> Self {
        RepositoryError::Storage(err.to_string())
    }
}

/// Raw row before kind and timestamps are decoded.
struct Row {
    profile_id: ProfileId,
    kind: String,
    distinct_key: String,
    last: Option<String>,
    next: Option<String>,
    removed: bool,
}

impl Row {
    fn decode(self) -> Result<TaskRecord, TaskStoreError> {
        let kind = TaskKind::parse(&self.kind)
            .ok_or_else(|| TaskStoreError::Corrupt(format!("unknown task kind {}", self.kind)))?;
        Ok(TaskRecord {
            key: TaskKey::with_distinct(self.profile_id, kind, self.distinct_key),
            last_execution_time: parse_time(self.last)?,
            next_execution_time: parse_time(self.next)?,
            removed: self.removed,
        })
    }
}

fn parse_time(value: Option<String>) -> Result<Option<DateTime<Utc>>, TaskStoreError> {
    value
        .map(|v| {
            DateTime::parse_from_rfc3339(&v)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| TaskStoreError::Corrupt(format!("bad timestamp {}: {}", v, e)))
        })
        .transpose()
}

/// Task schedules in a single SQLite table keyed by
/// `(profile_id, kind, distinct_key)`.
pub struct SqliteTaskRepository {
    conn: Mutex<Connection>,
}

impl SqliteTaskRepository {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, TaskStoreError> {
        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self, TaskStoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, TaskStoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS task_records (
                profile_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                distinct_key TEXT NOT NULL,
                last_execution_time TEXT,
                next_execution_time TEXT,
                removed INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (profile_id, kind, distinct_key)
            )",
            [],
        )?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn load(&self, key: &TaskKey) -> Result<Option<TaskRecord>, TaskStoreError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT profile_id, kind, distinct_key, last_execution_time, next_execution_time, removed
                 FROM task_records WHERE profile_id = ?1 AND kind = ?2 AND distinct_key = ?3",
                params![key.profile_id, key.kind.as_str(), key.distinct_key],
                |row| {
                    Ok(Row {
                        profile_id: row.get(0)?,
                        kind: row.get(1)?,
                        distinct_key: row.get(2)?,
                        last: row.get(3)?,
                        next: row.get(4)?,
                        removed: row.get(5)?,
                    })
                },
            )
            .optional()?;
        row.map(Row::decode).transpose()
    }

    pub fn load_kind(&self, profile_id: ProfileId, kind: TaskKind) -> Result<Vec<TaskRecord>, TaskStoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT profile_id, kind, distinct_key, last_execution_time, next_execution_time, removed
             FROM task_records WHERE profile_id = ?1 AND kind = ?2 ORDER BY distinct_key",
        )?;

        let rows = stmt.query_map(params![profile_id, kind.as_str()], |row| {
            Ok(Row {
                profile_id: row.get(0)?,
                kind: row.get(1)?,
                distinct_key: row.get(2)?,
                last: row.get(3)?,
                next: row.get(4)?,
                removed: row.get(5)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.decode()?);
        }
        Ok(records)
    }

    pub fn store(&self, record: &TaskRecord) -> Result<(), TaskStoreError> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO task_records
                (profile_id, kind, distinct_key, last_execution_time, next_execution_time, removed, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(profile_id, kind, distinct_key) DO UPDATE SET
                last_execution_time = excluded.last_execution_time,
                next_execution_time = excluded.next_execution_time,
                removed = excluded.removed,
                updated_at = excluded.updated_at",
            params![
                record.key.profile_id,
                record.key.kind.as_str(),
                record.key.distinct_key,
                record.last_execution_time.map(|t| t.to_rfc3339()),
                record.next_execution_time.map(|t| t.to_rfc3339()),
                record.removed,
                now
            ],
        )?;
        debug!("Stored schedule for {}", record.key);
        Ok(())
    }

    pub fn count(&self) -> Result<usize, TaskStoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM task_records", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl TaskRepository for SqliteTaskRepository {
    fn find(&self, key: &TaskKey) -> Result<Option<TaskRecord>, RepositoryError> {
        Ok(self.load(key)?)
    }

    fn find_by_profile_and_kind(
        &self,
        profile_id: ProfileId,
        kind: TaskKind,
    ) -> Result<Vec<TaskRecord>, RepositoryError> {
        Ok(self.load_kind(profile_id, kind)?)
    }

    fn save(&self, record: &TaskRecord) -> Result<(), RepositoryError> {
        Ok(self.store(record)?)
    }
}
