//! Types for child process spawning
//!
//! Describes what to launch and what flows back out of the diagnostic
//! side-channel.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::session::SessionId;

// ============================================================================
// Launch Types
// ============================================================================

/// Which seat a child process fills in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildRole {
    /// Rules engine: owns the board, legality and win detection
    Engine,
    /// AI opponent: picks moves and writes diagnostics to stderr
    Ai,
}

impl ChildRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Engine => "engine",
            Self::Ai => "ai",
        }
    }

    /// Only the AI's stderr is captured for the log relay
    pub fn captures_diagnostics(&self) -> bool {
        matches!(self, Self::Ai)
    }
}

/// Executable plus arguments for one child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ProgramSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

// ============================================================================
// Diagnostic Events
// ============================================================================

/// One line of AI diagnostics, tagged with the session it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    pub session_id: SessionId,
    pub log: String,
}
