//! Core types for the goal tracker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status given to a task when the client does not supply one.
pub const STATUS_IN_PROGRESS: &str = "進行中";

/// Status the client UI uses for finished tasks.
pub const STATUS_DONE: &str = "完了";

/// Upper bound of the progress scale (percent).
pub const PROGRESS_MAX: f64 = 100.0;

/// A goal groups related tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub name: String,
}

/// Goal as returned by `GET /goals/`, with the ids of the tasks filed under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalWithTasks {
    pub id: i64,
    pub name: String,
    pub task_ids: Vec<i64>,
}

/// Fields a client may supply when creating or replacing a task.
///
/// Every field except `id`, `progress` and `status` is required, so a PUT
/// that omits one fails instead of keeping the stored value. `id` is accepted
/// so a client can send a read-shape record back; the store assigns ids, and
/// on update it must match the path id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_progress")]
    pub progress: f64,
    #[serde(default = "default_status")]
    pub status: String,
    pub goal_id: i64,
}

fn default_progress() -> f64 {
    0.0
}

fn default_status() -> String {
    STATUS_IN_PROGRESS.to_string()
}

impl TaskInput {
    /// Build an input with the default progress and status applied.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        goal_id: i64,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            start_date,
            end_date,
            progress: default_progress(),
            status: default_status(),
            goal_id,
        }
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Check the field-level invariants that do not need the store.
    ///
    /// Goal existence is checked by the database inside the write transaction.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if !self.progress.is_finite() || !(0.0..=PROGRESS_MAX).contains(&self.progress) {
            return Err(TaskValidationError::ProgressOutOfRange(self.progress));
        }
        if self.end_date < self.start_date {
            return Err(TaskValidationError::EndBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.status.trim().is_empty() {
            return Err(TaskValidationError::EmptyStatus);
        }
        Ok(())
    }

    /// Reject a body whose `id` names a different task than the path.
    pub fn check_target(&self, task_id: i64) -> Result<(), TaskValidationError> {
        match self.id {
            Some(body_id) if body_id != task_id => Err(TaskValidationError::IdMismatch {
                path: task_id,
                body: body_id,
            }),
            _ => Ok(()),
        }
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub progress: f64,
    pub status: String,
    pub goal_id: i64,
}

impl Task {
    /// Combine a server-assigned id with the client-supplied fields.
    pub fn from_input(id: i64, input: &TaskInput) -> Self {
        Self {
            id,
            title: input.title.clone(),
            description: input.description.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            progress: input.progress,
            status: input.status.clone(),
            goal_id: input.goal_id,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == STATUS_DONE
    }
}

/// Field-level rejection of a [`TaskInput`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("progress must be between 0 and 100, got {0}")]
    ProgressOutOfRange(f64),
    #[error("end_date {end} is before start_date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("status must not be empty")]
    EmptyStatus,
    #[error("id {body} does not match task {path}")]
    IdMismatch { path: i64, body: i64 },
}

impl TaskValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "title",
            Self::ProgressOutOfRange(_) => "progress",
            Self::EndBeforeStart { .. } => "end_date",
            Self::EmptyStatus => "status",
            Self::IdMismatch { .. } => "id",
        }
    }
}
