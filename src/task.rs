//! Task model and the priority/status enumerations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task priority, totally ordered Low < Normal < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Normal => "Normal",
            Priority::High => "High",
        }
    }

    /// Parse a stored priority label. Absent or unrecognized labels compare as
    /// the lowest weight, so they map to `Low`.
    pub fn from_label(s: &str) -> Self {
        match s {
            "High" => Priority::High,
            "Normal" => Priority::Normal,
            _ => Priority::Low,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Pending,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Completed => "Completed",
        }
    }

    /// Parse a stored status label, defaulting to `Pending`.
    pub fn from_label(s: &str) -> Self {
        match s {
            "Completed" => Status::Completed,
            _ => Status::Pending,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted task. The id is assigned by the store and stable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub estimated_hours: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task draft that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub estimated_hours: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Normal);
        assert!(Priority::Normal < Priority::High);
        assert!(Priority::Low < Priority::High);
    }

    #[test]
    fn test_priority_label_roundtrip() {
        for p in [Priority::Low, Priority::Normal, Priority::High] {
            assert_eq!(Priority::from_label(p.as_str()), p);
        }
    }

    #[test]
    fn test_unknown_priority_label_is_low() {
        assert_eq!(Priority::from_label(""), Priority::Low);
        assert_eq!(Priority::from_label("Critical"), Priority::Low);
        assert_eq!(Priority::from_label("high"), Priority::Low);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(Status::from_label("Completed"), Status::Completed);
        assert_eq!(Status::from_label("Pending"), Status::Pending);
        assert_eq!(Status::from_label("anything else"), Status::Pending);
    }
}
