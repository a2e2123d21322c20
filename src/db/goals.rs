//! Goal queries.

use super::Database;
use crate::types::{Goal, GoalWithTasks};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn parse_goal_row(row: &Row) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

/// Check goal existence using an existing connection (avoids deadlock).
pub(crate) fn goal_exists_internal(conn: &Connection, goal_id: i64) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM goals WHERE id = ?1)",
        params![goal_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Insert a goal using an existing connection.
pub(crate) fn insert_goal_internal(conn: &Connection, name: &str) -> Result<Goal> {
    conn.execute("INSERT INTO goals (name) VALUES (?1)", params![name])?;
    Ok(Goal {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

fn task_ids_for_goal_internal(conn: &Connection, goal_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM tasks WHERE goal_id = ?1 ORDER BY id")?;
    let ids = stmt
        .query_map(params![goal_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(ids)
}

impl Database {
    /// Create a goal. Goals are not exposed for mutation over HTTP.
    pub fn create_goal(&self, name: &str) -> Result<Goal> {
        self.with_conn(|conn| insert_goal_internal(conn, name))
    }

    /// Get a goal by ID.
    pub fn get_goal(&self, goal_id: i64) -> Result<Option<Goal>> {
        self.with_conn(|conn| {
            let goal = conn
                .query_row(
                    "SELECT id, name FROM goals WHERE id = ?1",
                    params![goal_id],
                    parse_goal_row,
                )
                .optional()?;
            Ok(goal)
        })
    }

    pub fn goal_exists(&self, goal_id: i64) -> Result<bool> {
        self.with_conn(|conn| goal_exists_internal(conn, goal_id))
    }

    /// List all goals in id order.
    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM goals ORDER BY id")?;
            let goals = stmt
                .query_map([], parse_goal_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(goals)
        })
    }

    /// List all goals, each with the ids of its tasks.
    ///
    /// Task ids are looked up per goal under the same lock, so the result is
    /// a consistent snapshot.
    pub fn list_goals_with_tasks(&self) -> Result<Vec<GoalWithTasks>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM goals ORDER BY id")?;
            let goals = stmt
                .query_map([], parse_goal_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            goals
                .into_iter()
                .map(|goal| -> Result<GoalWithTasks> {
                    let task_ids = task_ids_for_goal_internal(conn, goal.id)?;
                    Ok(GoalWithTasks {
                        id: goal.id,
                        name: goal.name,
                        task_ids,
                    })
                })
                .collect()
        })
    }

    /// Ids of the tasks filed under a goal.
    pub fn task_ids_for_goal(&self, goal_id: i64) -> Result<Vec<i64>> {
        self.with_conn(|conn| task_ids_for_goal_internal(conn, goal_id))
    }

    pub fn count_goals(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM goals", [], |row| row.get(0))?;
            Ok(count)
        })
    }
}
