//! Error Handling Module
//!
//! A single error type shared by the leaf provider clients, the provider
//! registry and the task poller. Every variant carries enough context
//! (provider, status code, body snippet, task id) to diagnose a failure
//! without looking at transport internals.
//!
//! # Example
//!
//! ```rust,ignore
//! use genbridge::error::GenerationError;
//!
//! let error = GenerationError::provider_error("vectorengine", 503, "upstream busy");
//! assert_eq!(error.status_code(), Some(503));
//! assert!(error.is_transient());
//! ```

use crate::types::Capability;
use thiserror::Error;

/// Maximum number of body characters rendered by `Display`.
const BODY_SNIPPET_CHARS: usize = 512;

/// Why polling stopped before reaching a terminal provider state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller cancelled through a `CancelHandle`.
    Requested,
    /// The caller-supplied deadline passed.
    DeadlineExceeded,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::Requested => write!(f, "cancel requested"),
            CancelReason::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Errors produced by generation capabilities, the registry and the poller.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Connection, DNS, TLS or per-call timeout failure.
    #[error("Transport error ({provider}): {message}")]
    TransportError {
        provider: String,
        message: String,
        timeout: bool,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("Provider error ({provider}): status={status}, body={}", body_snippet(.body))]
    ProviderError {
        provider: String,
        status: u16,
        body: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("Decode error ({provider}): {message}")]
    DecodeError { provider: String, message: String },

    /// The response was well-formed but carried no usable content.
    #[error("Empty result ({provider}): {message}")]
    EmptyResult { provider: String, message: String },

    /// No provider could be selected for a capability.
    #[error("No provider configured for {capability} generation: {reason}")]
    NoProviderConfigured {
        capability: Capability,
        reason: String,
    },

    /// Invalid or incomplete configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Caller input rejected before any request was sent.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// An asynchronous job reached a terminal failure state at the provider.
    #[error("Task {task_id} failed at {provider}: {detail}")]
    ProviderTaskFailed {
        provider: String,
        task_id: String,
        detail: String,
    },

    /// An asynchronous job was still pending when the polling budget ran out.
    #[error("Task {task_id} at {provider} still pending after {attempts} status queries")]
    PollTimeout {
        provider: String,
        task_id: String,
        attempts: u32,
        last_error: Option<String>,
    },

    /// Polling was aborted by the caller.
    #[error("Polling for task {task_id} cancelled: {reason}")]
    Cancelled {
        task_id: String,
        reason: CancelReason,
    },

    /// The provider does not implement the requested operation.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Broken internal invariant (poisoned lock and the like).
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GenerationError>;

fn body_snippet(body: &str) -> String {
    if body.chars().count() <= BODY_SNIPPET_CHARS {
        return body.to_string();
    }
    let head: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
    format!("{head}...")
}

impl GenerationError {
    /// Map a `reqwest` failure that happened before a status code was available.
    pub fn transport(provider: impl Into<String>, err: &reqwest::Error) -> Self {
        let timeout = err.is_timeout();
        Self::TransportError {
            provider: provider.into(),
            message: transport_message(err, timeout),
            timeout,
        }
    }

    pub fn provider_error(provider: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.into(),
            status,
            body: body.into(),
        }
    }

    pub fn decode(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DecodeError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn empty_result(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EmptyResult {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn no_provider(capability: Capability, reason: impl Into<String>) -> Self {
        Self::NoProviderConfigured {
            capability,
            reason: reason.into(),
        }
    }

    /// HTTP status code when the error came from a provider response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ProviderError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a repeated status query may succeed where this one failed.
    ///
    /// Only the task poller acts on this; leaf clients never retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::TransportError { .. } => true,
            Self::ProviderError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Task id attached to poller outcomes.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::ProviderTaskFailed { task_id, .. }
            | Self::PollTimeout { task_id, .. }
            | Self::Cancelled { task_id, .. } => Some(task_id),
            _ => None,
        }
    }

    /// Whether the error ends polling because the caller gave up.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Render an error with its source chain, since the top-level `reqwest`
/// message omits the underlying cause.
fn transport_message(err: &(dyn std::error::Error + 'static), timeout: bool) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    if timeout && !message.to_ascii_lowercase().contains("timed out") {
        message.push_str(" (timed out)");
    }
    message
}
