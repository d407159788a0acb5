//! API request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Priority, Status, Task};

/// Create-task request. `prompt` wins over `title` when both are set; at
/// least one must be non-empty.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    pub message: String,
    pub task: Task,
}

/// Partial update: absent fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub estimated_hours: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether a completion credential is configured. Without one the service
    /// still runs; AI-derived fields just stay at their defaults.
    pub ai_enabled: bool,
}
