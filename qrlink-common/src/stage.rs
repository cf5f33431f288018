//! Stage outcome taxonomy
//!
//! Every collaborator the pipeline calls returns a [`StageResult`]. Failures
//! never cross a stage boundary as panics or propagated errors; the
//! orchestrator matches on the [`StageError`] variant, reports it, and moves
//! on to the next stage with a degraded input.

use std::fmt;
use thiserror::Error;

/// Result of a single pipeline stage
pub type StageResult<T> = std::result::Result<T, StageError>;

/// Discrete external operations performed by one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Greeting prompt (display name)
    Welcome,
    /// URL and mobile number prompts
    Prompt,
    /// QR image generation
    Encode,
    /// Remote summary request
    Summarize,
    /// Database write
    Persist,
    /// Resource release at the end of the run
    Release,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Welcome => "welcome",
            Stage::Prompt => "prompt",
            Stage::Encode => "encode",
            Stage::Summarize => "summarize",
            Stage::Persist => "persist",
            Stage::Release => "release",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed failure reason for a stage
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StageError {
    /// Console exhausted, closed, or unreadable
    #[error("Input unavailable: {0}")]
    InputUnavailable(String),

    /// Caller supplied arguments the stage cannot work with
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Payload could not be turned into a QR symbol at the requested size
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// Writing an output artifact failed
    #[error("Write failed: {0}")]
    Write(String),

    /// Network-level failure (DNS, TLS, reset, timeout)
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Remote side answered with a non-success status
    #[error("HTTP status {status}: {message}")]
    Status { status: u16, message: String },

    /// Remote side answered 2xx without a usable body
    #[error("Empty response body")]
    EmptyBody,

    /// Required configuration keys are missing
    #[error("Configuration incomplete: {0}")]
    ConfigIncomplete(String),

    /// SQL execution or connection failure
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Closing a resource failed
    #[error("Release failed: {0}")]
    Release(String),
}

impl StageError {
    /// True for failures caused by the remote endpoint or the network
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            StageError::Transport(_) | StageError::Status { .. } | StageError::EmptyBody
        )
    }
}
