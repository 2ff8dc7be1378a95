// src/error.rs
// Error taxonomy for session orchestration

use thiserror::Error;

/// Errors surfaced by the orchestration core.
///
/// Raw I/O failures from child processes are folded into `Spawn` or
/// `Protocol` at the handle boundary and never escape as `std::io::Error`.
#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid move: {0}")]
    InvalidMove(i32),

    #[error("no such session: {0}")]
    NoSuchSession(String),

    #[error("session closed: {0}")]
    SessionClosed(String),

    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Result using ArenaError
pub type Result<T> = std::result::Result<T, ArenaError>;

impl ArenaError {
    /// Stable machine-readable kind, used as the `error` field at the boundary
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => "spawn_error",
            Self::Protocol(_) => "protocol_error",
            Self::InvalidMove(_) => "invalid_move",
            Self::NoSuchSession(_) => "no_such_session",
            Self::SessionClosed(_) => "session_closed",
            Self::UnknownModel(_) => "unknown_model",
            Self::Config(_) => "config_error",
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

impl From<tokio::task::JoinError> for ArenaError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            ArenaError::Protocol("move task cancelled".to_string())
        } else {
            ArenaError::Protocol(format!("move task failed: {err}"))
        }
    }
}
