//! Weekly report generation over completed tasks.

use std::fmt::Write as _;

use super::TaskAi;
use crate::task::Task;

pub(crate) const EMPTY_REPORT: &str = "No tasks were completed this period.";
pub(crate) const REPORT_UNAVAILABLE: &str = "Report generation failed.";

impl TaskAi {
    /// Summarize the given completed tasks. Returns a fixed message for an
    /// empty list (no model call) and a fixed fallback on request failure;
    /// otherwise the model's reply is returned verbatim.
    pub async fn generate_report(&self, completed: &[Task]) -> String {
        if completed.is_empty() {
            return EMPTY_REPORT.to_string();
        }

        let mut listing = String::from("Completed tasks:\n");
        for (i, task) in completed.iter().enumerate() {
            let _ = writeln!(
                listing,
                "{}. {} (estimated: {:.1}h)",
                i + 1,
                task.title,
                task.estimated_hours
            );
        }

        let prompt = format!(
            "Write a weekly report from the task list below.\n\
             Requirements:\n\
             1. Markdown formatting (**bold**, - bullet lists).\n\
             2. Summarize the highlights of the week.\n\
             3. Compute the total hours spent.\n\n\
             {}",
            listing
        );

        match self.client.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("report generation failed: {}", e);
                REPORT_UNAVAILABLE.to_string()
            }
        }
    }
}
