// src/error.rs
//! Error taxonomy for one digest run.
//!
//! Only [`DigestError`] is allowed to stop a run. The per-source, per-item
//! errors below are logged where they happen and folded into an empty
//! contribution, a zero score or a dropped message.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DigestError>;

/// Fatal setup errors. Anything here aborts the run before (or instead of) fetching.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("source credentials rejected: {0}")]
    InvalidCredentials(String),

    #[error("source authentication endpoint unavailable: {0}")]
    AuthUnavailable(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Failure fetching one source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Source unreachable, rate-limited, private/banned, or returned garbage.
    #[error("source {source_id} unavailable: {reason}")]
    Unavailable { source_id: String, reason: String },

    /// Credentials no longer accepted by the source API.
    #[error("source credentials rejected: {0}")]
    Unauthorized(String),
}

impl FetchError {
    pub fn unavailable(source_id: &str, reason: impl Into<String>) -> Self {
        FetchError::Unavailable {
            source_id: source_id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::Unauthorized(_))
    }
}

impl From<FetchError> for DigestError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Unauthorized(msg) => DigestError::InvalidCredentials(msg),
            other => DigestError::AuthUnavailable(other.to_string()),
        }
    }
}

/// Failure scoring one candidate. Collapsed to a zero score at the scorer boundary.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("oracle request failed: {0}")]
    Transport(String),

    #[error("oracle returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed oracle response: {0}")]
    Malformed(String),

    #[error("no score digits in oracle reply {0:?}")]
    NoDigits(String),
}

impl From<reqwest::Error> for ScoreError {
    fn from(err: reqwest::Error) -> Self {
        ScoreError::Transport(err.to_string())
    }
}

/// Failure delivering one message.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery request failed: {0}")]
    Transport(String),

    #[error("delivery endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Transport(err.to_string())
    }
}
