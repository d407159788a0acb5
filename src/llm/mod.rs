//! Chat-completion client for the task intelligence layer.
//!
//! A trait-based seam over the remote completion service so the AI core can be
//! exercised with a scripted client in tests. The DeepSeek client is the only
//! production implementation.

mod deepseek;
pub mod error;

pub use deepseek::DeepSeekClient;
pub use error::CompletionError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Role in a chat conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Trait for completion clients.
///
/// One operation: send a single prompt, get the raw reply text back. Callers
/// are expected to treat any error as "no signal" rather than propagating it.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Shared completion client handle.
pub type SharedCompletionClient = Arc<dyn CompletionClient>;
