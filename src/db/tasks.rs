//! Task CRUD operations.

use super::Database;
use super::goals::goal_exists_internal;
use crate::error::ApiError;
use crate::types::{Task, TaskInput};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// Dates are stored as ISO `YYYY-MM-DD` text.
const DATE_FORMAT: &str = "%Y-%m-%d";

const TASK_COLUMNS: &str =
    "id, title, description, start_date, end_date, progress, status, goal_id";

fn parse_date_column(row: &Row, idx: &str) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| {
        let column = row.as_ref().column_index(idx).unwrap_or(0);
        rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e))
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        start_date: parse_date_column(row, "start_date")?,
        end_date: parse_date_column(row, "end_date")?,
        progress: row.get("progress")?,
        status: row.get("status")?,
        goal_id: row.get("goal_id")?,
    })
}

/// Internal helper to get a task using an existing connection (avoids deadlock).
fn get_task_internal(conn: &Connection, task_id: i64) -> Result<Option<Task>> {
    let sql = format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS);
    let task = conn
        .query_row(&sql, params![task_id], parse_task_row)
        .optional()?;
    Ok(task)
}

/// Reject the write unless the referenced goal exists.
fn ensure_goal_exists(conn: &Connection, goal_id: i64) -> Result<()> {
    if !goal_exists_internal(conn, goal_id)? {
        return Err(ApiError::unknown_goal(goal_id).into());
    }
    Ok(())
}

/// Insert a task using an existing connection.
pub(crate) fn insert_task_internal(conn: &Connection, input: &TaskInput) -> Result<Task> {
    ensure_goal_exists(conn, input.goal_id)?;

    conn.execute(
        "INSERT INTO tasks (title, description, start_date, end_date, progress, status, goal_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            input.title,
            input.description,
            format_date(input.start_date),
            format_date(input.end_date),
            input.progress,
            input.status,
            input.goal_id,
        ],
    )?;

    Ok(Task::from_input(conn.last_insert_rowid(), input))
}

impl Database {
    /// Create a new task. The id is assigned by the store.
    pub fn create_task(&self, input: &TaskInput) -> Result<Task> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let task = insert_task_internal(&tx, input)?;
            tx.commit()?;
            Ok(task)
        })
    }

    /// Get a task by ID.
    pub fn get_task(&self, task_id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// List all tasks in insertion order.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM tasks ORDER BY id", TASK_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map([], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// List the tasks of one goal in insertion order.
    ///
    /// Returns `None` when the goal does not exist. The existence check and the
    /// listing run under one lock.
    pub fn list_tasks_for_goal(&self, goal_id: i64) -> Result<Option<Vec<Task>>> {
        self.with_conn(|conn| {
            if !goal_exists_internal(conn, goal_id)? {
                return Ok(None);
            }
            let sql = format!(
                "SELECT {} FROM tasks WHERE goal_id = ?1 ORDER BY id",
                TASK_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(params![goal_id], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(Some(tasks))
        })
    }

    /// Replace every writable field of a task.
    ///
    /// Returns `None` when no task has the given id; nothing is written then.
    pub fn update_task(&self, task_id: i64, input: &TaskInput) -> Result<Option<Task>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if get_task_internal(&tx, task_id)?.is_none() {
                return Ok(None);
            }
            ensure_goal_exists(&tx, input.goal_id)?;

            tx.execute(
                "UPDATE tasks SET title = ?1, description = ?2, start_date = ?3, end_date = ?4,
                    progress = ?5, status = ?6, goal_id = ?7
                 WHERE id = ?8",
                params![
                    input.title,
                    input.description,
                    format_date(input.start_date),
                    format_date(input.end_date),
                    input.progress,
                    input.status,
                    input.goal_id,
                    task_id,
                ],
            )?;

            let updated = get_task_internal(&tx, task_id)?;
            tx.commit()?;
            Ok(updated)
        })
    }

    /// Permanently delete a task. Returns `false` when the id is unknown.
    pub fn delete_task(&self, task_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            tx.commit()?;
            Ok(removed > 0)
        })
    }

    pub fn count_tasks(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
            Ok(count)
        })
    }
}
