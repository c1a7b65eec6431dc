//! Error types for the AlterEgo domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; only [`ProviderError`] is
//! allowed to end a conversation turn early; the rest are absorbed and
//! degraded by their callers.

use thiserror::Error;

// --- Bounded context errors ---

/// Failures talking to the language model. A turn that hits one of these is
/// aborted and answered with the fixed apology text.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

/// Failures gathering grounding data. Callers degrade these to an empty
/// section; they are surfaced only in logs.
#[derive(Debug, Clone, Error)]
pub enum ProfileError {
    #[error("Profile source unavailable: {path} ({reason})")]
    SourceUnavailable { path: String, reason: String },

    #[error("Remote fetch failed for {endpoint}: {reason}")]
    RemoteFetchFailed { endpoint: String, reason: String },

    #[error("Remote profile unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("Notifier not configured: {0}")]
    NotConfigured(String),

    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),
}
