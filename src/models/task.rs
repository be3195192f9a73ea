//! Task model: scheduled field work assigned to a worker.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::patch::nullable;
use super::validation::{require_date_order, require_text, Validate, ValidationError};

/// Kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    Planting,
    Fertilizing,
    PestControl,
    Harvesting,
    Pruning,
    Irrigation,
    Other,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Planting => "PLANTING",
            TaskType::Fertilizing => "FERTILIZING",
            TaskType::PestControl => "PEST_CONTROL",
            TaskType::Harvesting => "HARVESTING",
            TaskType::Pruning => "PRUNING",
            TaskType::Irrigation => "IRRIGATION",
            TaskType::Other => "OTHER",
        }
    }
}

impl FromStr for TaskType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLANTING" => Ok(TaskType::Planting),
            "FERTILIZING" => Ok(TaskType::Fertilizing),
            "PEST_CONTROL" => Ok(TaskType::PestControl),
            "HARVESTING" => Ok(TaskType::Harvesting),
            "PRUNING" => Ok(TaskType::Pruning),
            "IRRIGATION" => Ok(TaskType::Irrigation),
            "OTHER" => Ok(TaskType::Other),
            other => Err(ValidationError::new(format!("Unknown task type: {}", other))),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TaskStatus::Pending),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "COMPLETED" => Ok(TaskStatus::Completed),
            "CANCELLED" => Ok(TaskStatus::Cancelled),
            other => Err(ValidationError::new(format!(
                "Unknown task status: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work on a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub field_id: i64,
    /// Name of the referenced field, joined in by the server.
    #[serde(default)]
    pub field_name: String,
    pub task_type: TaskType,
    pub assigned_worker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Request body for creating a new task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub field_id: i64,
    pub task_type: TaskType,
    pub assigned_worker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_status")]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Pending
}

impl Validate for CreateTaskRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.assigned_worker, "Assigned worker")?;
        require_date_order(self.start_date, self.end_date)
    }
}

/// Request body for updating an existing task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_worker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl Validate for UpdateTaskRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(worker) = &self.assigned_worker {
            require_text(worker, "Assigned worker")?;
        }
        // The stored counterpart is checked once the patch is merged.
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            require_date_order(start, end)?;
        }
        Ok(())
    }
}

/// Query parameters accepted by `GET /tasks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Case-insensitive substring of the worker name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_worker: Option<String>,
    /// Earliest start date, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Latest start date, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}
