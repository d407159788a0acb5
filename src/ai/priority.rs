//! Additive urgency scoring.
//!
//! Deterministic signals (deadline proximity, keywords) are pure functions;
//! the dependency-likelihood signal consults the model and contributes zero
//! whenever the model is unavailable. Scoring never fails.

use chrono::{DateTime, Utc};

use super::TaskAi;
use crate::task::{Priority, Status};

const SCORE_OVERDUE: i32 = 100;
const SCORE_DUE_24H: i32 = 50;
const SCORE_DUE_72H: i32 = 30;
const SCORE_KEYWORD: i32 = 30;
const SCORE_DEPENDENCY: i32 = 40;

const HIGH_THRESHOLD: i32 = 40;
const NORMAL_THRESHOLD: i32 = 20;

const URGENCY_KEYWORDS: &[&str] = &["urgent", "must", "launch", "紧急", "必须", "上线"];

/// Deadline proximity signal.
fn deadline_score(due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i32 {
    let Some(due) = due_date else { return 0 };
    let seconds_left = (due - now).num_seconds();
    if seconds_left < 0 {
        SCORE_OVERDUE
    } else if seconds_left <= 24 * 3600 {
        SCORE_DUE_24H
    } else if seconds_left <= 72 * 3600 {
        SCORE_DUE_72H
    } else {
        0
    }
}

/// Urgency keyword signal, case-insensitive.
fn keyword_score(title: &str) -> i32 {
    let lower = title.to_lowercase();
    if URGENCY_KEYWORDS.iter().any(|k| lower.contains(k)) {
        SCORE_KEYWORD
    } else {
        0
    }
}

fn score_to_priority(score: i32) -> Priority {
    if score >= HIGH_THRESHOLD {
        Priority::High
    } else if score >= NORMAL_THRESHOLD {
        Priority::Normal
    } else {
        Priority::Low
    }
}

impl TaskAi {
    /// Score a task's priority from its title and (possibly absent) due date.
    pub(crate) async fn score_priority(
        &self,
        title: &str,
        due_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Priority {
        let mut score = deadline_score(due_date, now) + keyword_score(title);
        score += self.dependency_score(title).await;
        score_to_priority(score)
    }

    /// Ask the model whether the new task is a prerequisite of any existing
    /// pending task. No pending tasks means no question is asked.
    async fn dependency_score(&self, title: &str) -> i32 {
        let pending = match self.store.find_by_status(Status::Pending) {
            Ok(pending) => pending,
            Err(e) => {
                tracing::warn!("dependency signal skipped, store unavailable: {}", e);
                return 0;
            }
        };

        let mut titles: Vec<&str> = pending
            .iter()
            .filter(|t| t.title != title)
            .map(|t| t.title.as_str())
            .collect();
        if titles.is_empty() {
            return 0;
        }
        titles.truncate(self.dependency_title_limit);

        let prompt = format!(
            "Existing pending tasks: {:?}. New task: \"{}\". Is the new task a prerequisite \
             for completing any of the listed tasks? Reply Yes or No.",
            titles, title
        );

        match self.client.complete(&prompt).await {
            Ok(reply) if reply.to_lowercase().contains("yes") => SCORE_DEPENDENCY,
            Ok(_) => 0,
            Err(e) => {
                tracing::debug!("dependency signal unavailable: {}", e);
                0
            }
        }
    }
}
