//! SQLite-backed task store.
//!
//! Store errors are the only failure category that surfaces to API callers;
//! everything above this layer degrades silently.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::task::{NewTask, Priority, Status, Task};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    status          TEXT NOT NULL,
    due_date        INTEGER,
    priority        TEXT NOT NULL,
    estimated_hours REAL NOT NULL DEFAULT 0,
    created_at      INTEGER NOT NULL,
    updated_at      INTEGER NOT NULL
);
";

/// Task store over a SQLite connection.
#[derive(Clone)]
pub struct TaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl TaskStore {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL for concurrent readers alongside the detached synchronizer
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;",
        )?;

        Self::init(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().expect("store mutex poisoned");
        f(&conn)
    }

    /// Insert a draft and return the stored task with its assigned id.
    pub fn create(&self, draft: &NewTask) -> Result<Task> {
        let now = Utc::now();
        let id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (title, description, status, due_date, priority, estimated_hours, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    draft.title,
                    draft.description,
                    draft.status.as_str(),
                    draft.due_date.map(|d| d.timestamp_millis()),
                    draft.priority.as_str(),
                    draft.estimated_hours,
                    now.timestamp_millis(),
                    now.timestamp_millis(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        Ok(Task {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: draft.status,
            due_date: draft.due_date,
            priority: draft.priority,
            estimated_hours: draft.estimated_hours,
            created_at: now,
            updated_at: now,
        })
    }

    /// All tasks, most recently created first.
    pub fn find_all(&self) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM tasks ORDER BY created_at DESC, id DESC")?;
            let tasks = stmt
                .query_map([], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Tasks with the given status, most recently created first.
    pub fn find_by_status(&self, status: Status) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM tasks WHERE status = ?1 ORDER BY created_at DESC, id DESC",
            )?;
            let tasks = stmt
                .query_map(params![status.as_str()], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1")?;
            match stmt.query_row(params![id], parse_task_row) {
                Ok(task) => Ok(Some(task)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Full-record replace. Fails if the task does not exist.
    pub fn update(&self, task: &Task) -> Result<()> {
        let updated = self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE tasks SET title = ?1, description = ?2, status = ?3, due_date = ?4,
                 priority = ?5, estimated_hours = ?6, updated_at = ?7 WHERE id = ?8",
                params![
                    task.title,
                    task.description,
                    task.status.as_str(),
                    task.due_date.map(|d| d.timestamp_millis()),
                    task.priority.as_str(),
                    task.estimated_hours,
                    Utc::now().timestamp_millis(),
                    task.id,
                ],
            )?;
            Ok(n)
        })?;
        if updated == 0 {
            bail!("task {} not found", task.id);
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            Ok(())
        })
    }
}

fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let status: String = row.get("status")?;
    let priority: String = row.get("priority")?;
    let due_date: Option<i64> = row.get("due_date")?;
    let created_at: i64 = row.get("created_at")?;
    let updated_at: i64 = row.get("updated_at")?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: Status::from_label(&status),
        due_date: due_date.and_then(DateTime::from_timestamp_millis),
        priority: Priority::from_label(&priority),
        estimated_hours: row.get("estimated_hours")?,
        created_at: DateTime::from_timestamp_millis(created_at).unwrap_or_default(),
        updated_at: DateTime::from_timestamp_millis(updated_at).unwrap_or_default(),
    })
}
