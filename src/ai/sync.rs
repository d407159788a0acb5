//! Reverse-dependency priority escalation.
//!
//! After a task is created, existing lower-priority pending tasks that the
//! model judges to be its prerequisites are raised to the new task's priority.
//! This runs detached from the originating request; every failure here is
//! logged and swallowed.

use regex::Regex;
use std::fmt::Write as _;
use std::sync::OnceLock;

use super::TaskAi;
use crate::task::{Priority, Status, Task};

/// Audit message written into an escalated task's description.
pub fn audit_description(trigger_title: &str) -> String {
    format!(
        "Priority raised automatically: prerequisite of task [{}].",
        trigger_title
    )
}

/// Extract every integer-like token from a model reply. The reply is asked to
/// be a JSON array of ids but is not required to be well-formed, so a
/// permissive scan is used instead of strict parsing.
fn integer_tokens(reply: &str) -> Vec<i64> {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    let re = TOKEN_RE.get_or_init(|| Regex::new(r"\d+").expect("integer token pattern"));
    re.find_iter(reply)
        .filter_map(|m| m.as_str().parse::<i64>().ok())
        .collect()
}

impl TaskAi {
    /// Escalate pending tasks that are prerequisites of `trigger`.
    ///
    /// Candidates are pending tasks with a strictly lower priority, capped at
    /// the configured limit. Matched candidates get the trigger's priority
    /// (never higher) and an audit description. Each update is independent; a
    /// store failure on one candidate does not block the rest.
    pub async fn sync_priorities(&self, trigger: &Task) {
        // A Low-priority task cannot be more important than anything.
        if trigger.priority == Priority::Low {
            return;
        }

        let all = match self.store.find_all() {
            Ok(all) => all,
            Err(e) => {
                tracing::warn!("dependency sync skipped, store unavailable: {}", e);
                return;
            }
        };

        let mut candidates: Vec<Task> = all
            .into_iter()
            .filter(|t| {
                t.status == Status::Pending && t.id != trigger.id && t.priority < trigger.priority
            })
            .collect();
        if candidates.is_empty() {
            return;
        }
        candidates.truncate(self.sync_candidate_limit);

        let mut listing = String::new();
        for c in &candidates {
            let _ = write!(listing, "{{\"id\": {}, \"title\": \"{}\"}},", c.id, c.title);
        }
        let prompt = format!(
            "New task: \"{}\" (priority: {})\n\n\
             Existing lower-priority tasks:\n[{}]\n\n\
             Which of the listed tasks are prerequisites or implicit dependencies that must be \
             finished before the new task can be completed? For example, \"buy the server\" is a \
             prerequisite of \"deploy the website\".\n\n\
             Reply with a JSON array of the matching task ids only, for example: [2, 5]. \
             Reply with an empty array if there are none.",
            trigger.title,
            trigger.priority,
            listing.trim_end_matches(',')
        );

        let reply = match self.client.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("dependency sync aborted: {}", e);
                return;
            }
        };

        for id in integer_tokens(&reply) {
            // Ids outside the candidate set are ignored, whatever the model says.
            let Some(candidate) = candidates.iter().find(|t| t.id == id) else {
                continue;
            };
            let mut escalated = candidate.clone();
            escalated.priority = trigger.priority;
            escalated.description = audit_description(&trigger.title);

            tracing::info!(
                "escalating task {} ({}) to priority {}",
                escalated.id,
                escalated.title,
                escalated.priority
            );
            if let Err(e) = self.store.update(&escalated) {
                tracing::warn!("failed to escalate task {}: {}", escalated.id, e);
            }
        }
    }
}
