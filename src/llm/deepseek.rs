//! DeepSeek chat-completion client.
//!
//! Single-shot: one request per call under a bounded timeout, no retries. The
//! surrounding logic treats any failure as "no signal", so retrying here would
//! only add latency to a request path that must not block on the model.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatMessage, CompletionClient, CompletionError, Role};
use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

const SYSTEM_INSTRUCTION: &str =
    "You are a project management assistant. Respond directly with the requested output, no filler.";

/// Chat-completion client for a DeepSeek-compatible endpoint.
pub struct DeepSeekClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl DeepSeekClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl CompletionClient for DeepSeekClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        // Fail closed before any network I/O when no credential is configured.
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingCredential)?;

        let request = CompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage::new(Role::System, SYSTEM_INSTRUCTION),
                ChatMessage::new(Role::User, prompt),
            ],
        };

        tracing::debug!("sending completion request to {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Network(format!("request timeout: {}", e))
                } else if e.is_connect() {
                    CompletionError::Network(format!("connection failed: {}", e))
                } else {
                    CompletionError::Network(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Decode(format!("{}, body: {}", e, body)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyReply)?;

        Ok(choice.message.content)
    }
}

/// Completion API request format.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

/// Completion API response format.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_fails_without_network() {
        let client = DeepSeekClient::new(&Config::default());
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, CompletionError::MissingCredential));
    }

    #[test]
    fn test_response_decoding() {
        let body = r#"{"choices":[{"message":{"content":"Yes"}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Yes");
    }

    #[test]
    fn test_empty_choices_decodes() {
        let body = r#"{"choices":[]}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.choices.is_empty());
    }

    #[test]
    fn test_request_serialization() {
        let request = CompletionRequest {
            model: "deepseek-r1-250528",
            messages: vec![
                ChatMessage::new(Role::System, "system"),
                ChatMessage::new(Role::User, "user"),
            ],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "deepseek-r1-250528");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "user");
    }
}
