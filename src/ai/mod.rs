//! Task intelligence layer.
//!
//! Everything the completion service is consulted for lives here: attribute
//! extraction from free text, priority scoring, reverse-dependency escalation,
//! and report generation. The implementation is split per concern:
//! - `extract`: due date / estimated hours from raw input
//! - `priority`: additive urgency scoring
//! - `sync`: escalation of existing prerequisite tasks
//! - `report`: weekly summary over completed tasks
//! - `sanitize`: code-fence stripping for model replies
//!
//! Every completion failure in this layer degrades to a default value; none of
//! it ever fails the surrounding request.

mod extract;
mod priority;
mod report;
mod sanitize;
mod sync;

pub use sanitize::strip_code_fences;
pub use sync::audit_description;

use chrono::Utc;

use crate::config::Config;
use crate::llm::SharedCompletionClient;
use crate::store::TaskStore;
use crate::task::{NewTask, Priority, Status};

/// AI-backed task analysis service.
pub struct TaskAi {
    client: SharedCompletionClient,
    store: TaskStore,
    sync_candidate_limit: usize,
    dependency_title_limit: usize,
}

impl TaskAi {
    pub fn new(client: SharedCompletionClient, store: TaskStore, config: &Config) -> Self {
        Self {
            client,
            store,
            sync_candidate_limit: config.sync_candidate_limit,
            dependency_title_limit: config.dependency_title_limit,
        }
    }

    /// Turn raw input text into a task draft: extract attributes, then score
    /// the priority. Always succeeds; AI failures leave fields at defaults.
    pub async fn parse_task_from_input(&self, input: &str) -> NewTask {
        let now = Utc::now();
        let attributes = self.extract_attributes(input, now).await;

        let mut task = NewTask {
            title: input.to_string(),
            description: "Parsed automatically from free-text input.".to_string(),
            status: Status::Pending,
            due_date: attributes.due_date,
            priority: Priority::Low,
            estimated_hours: attributes.estimated_hours,
        };
        task.priority = self.score_priority(&task.title, task.due_date, now).await;
        task
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted completion client for exercising the AI core without a network.

    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::llm::{CompletionClient, CompletionError};

    /// Replays a queue of canned outcomes; any call past the end of the queue
    /// behaves like an unconfigured client.
    pub(crate) struct ScriptedClient {
        replies: Mutex<VecDeque<Result<String, CompletionError>>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        pub(crate) fn new() -> Self {
            Self {
                replies: Mutex::new(VecDeque::new()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn with_reply(self, reply: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Ok(reply.to_string()));
            self
        }

        pub(crate) fn with_error(self, error: CompletionError) -> Self {
            self.replies.lock().unwrap().push_back(Err(error));
            self
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(CompletionError::MissingCredential))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedClient;
    use super::*;
    use crate::task::Status;
    use std::sync::Arc;

    fn task_ai(client: ScriptedClient) -> (TaskAi, Arc<ScriptedClient>) {
        let client = Arc::new(client);
        let store = TaskStore::open_in_memory().unwrap();
        let ai = TaskAi::new(client.clone(), store, &Config::default());
        (ai, client)
    }

    #[tokio::test]
    async fn test_parse_without_credential_yields_valid_task() {
        // No scripted replies: every completion call fails like an
        // unconfigured client. The draft must still be fully formed.
        let (ai, _client) = task_ai(ScriptedClient::new());
        let task = ai.parse_task_from_input("write the quarterly summary").await;

        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.priority, Priority::Low);
        assert!(task.due_date.is_none());
        assert_eq!(task.estimated_hours, 0.0);
        assert_eq!(task.title, "write the quarterly summary");
    }

    #[tokio::test]
    async fn test_parse_applies_extracted_attributes() {
        let (ai, _client) = task_ai(
            ScriptedClient::new()
                .with_reply(r#"{"due_date": "2030-06-01 12:00:00", "estimated_hours": 3.5}"#),
        );
        let task = ai.parse_task_from_input("prepare demo").await;

        assert_eq!(task.estimated_hours, 3.5);
        assert!(task.due_date.is_some());
    }

    #[tokio::test]
    async fn test_parse_keyword_title_without_ai_scores_normal() {
        // Deadline unknown, no pending tasks: only the keyword signal fires.
        let (ai, _client) = task_ai(ScriptedClient::new());
        let task = ai.parse_task_from_input("urgent: rotate the signing keys").await;
        assert_eq!(task.priority, Priority::Normal);
    }
}
