//! Attribute extraction from free-text task input.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use super::{strip_code_fences, TaskAi};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Attributes inferred from raw input. Zero-valued fields mean "unknown".
#[derive(Debug, Default)]
pub(crate) struct TaskAttributes {
    pub due_date: Option<DateTime<Utc>>,
    pub estimated_hours: f64,
}

/// Wire shape of the extraction reply. Missing fields decode to defaults so a
/// partial reply still contributes what it can.
#[derive(Debug, Default, Deserialize)]
struct ExtractionReply {
    #[serde(default)]
    due_date: String,
    #[serde(default)]
    estimated_hours: f64,
}

impl TaskAi {
    /// Ask the model for a due date and effort estimate. Request failures,
    /// undecodable replies, and unparseable dates all degrade to defaults.
    pub(crate) async fn extract_attributes(
        &self,
        input: &str,
        now: DateTime<Utc>,
    ) -> TaskAttributes {
        let prompt = format!(
            "Current time: {}. Task: \"{}\". Extract the deadline (due_date, format YYYY-MM-DD HH:MM:SS) \
             and the estimated effort in hours (estimated_hours). Reply with JSON only.",
            now.format(DATE_FORMAT),
            input
        );

        let reply = match self.client.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!("attribute extraction unavailable: {}", e);
                return TaskAttributes::default();
            }
        };

        let decoded: ExtractionReply = match serde_json::from_str(strip_code_fences(&reply)) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!("discarding undecodable extraction reply ({}): {}", e, reply);
                return TaskAttributes::default();
            }
        };

        let due_date = if decoded.due_date.is_empty() {
            None
        } else {
            match NaiveDateTime::parse_from_str(&decoded.due_date, DATE_FORMAT) {
                Ok(naive) => Some(naive.and_utc()),
                Err(e) => {
                    tracing::debug!(
                        "discarding unparseable due date \"{}\": {}",
                        decoded.due_date,
                        e
                    );
                    None
                }
            }
        };

        TaskAttributes {
            due_date,
            estimated_hours: decoded.estimated_hours.max(0.0),
        }
    }
}
