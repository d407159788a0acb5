//! Typed errors for the completion client.

use thiserror::Error;

/// Failure modes of a single completion call.
///
/// No variant is retryable by contract: a failed attempt is a failed call, and
/// the callers degrade to default values instead of retrying.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// No credential configured; the call fails before any network I/O.
    #[error("no completion credential configured")]
    MissingCredential,

    /// Transport-level failure (connect, timeout, mid-body error).
    #[error("completion request failed: {0}")]
    Network(String),

    /// Non-success HTTP status from the completion endpoint.
    #[error("completion endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not decode into the expected shape.
    #[error("failed to decode completion response: {0}")]
    Decode(String),

    /// Response decoded but contained zero choices.
    #[error("completion reply contained no choices")]
    EmptyReply,
}
