// src/config/mod.rs
// Service configuration from ~/.gomoku-arena/config.toml, overridable from the CLI

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ArenaError, Result};
use crate::session::registry::DEFAULT_RETIRED_CAPACITY;
use crate::session::SessionSettings;
use crate::spawner::ProgramSpec;

/// Named options for the orchestrator and its HTTP binding
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Rules engine executable
    pub engine_path: PathBuf,
    /// Directory holding selectable AI executables
    pub models_dir: PathBuf,
    /// File name (inside `models_dir`) of the model new sessions use
    pub current_model: String,
    pub host: String,
    pub port: u16,
    /// Bounded wait for one child round trip
    pub request_timeout_secs: u64,
    /// Buffered AI log lines per session
    pub log_capacity: usize,
    /// Torn-down session ids remembered for `session_closed` errors
    pub retired_capacity: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            engine_path: PathBuf::from("./modules/logic/engine"),
            models_dir: PathBuf::from("./modules/models"),
            current_model: "bot_final".to_string(),
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_secs: 10,
            log_capacity: 256,
            retired_capacity: DEFAULT_RETIRED_CAPACITY,
        }
    }
}

impl ArenaConfig {
    /// Load from an explicit file, or from the default location if it exists.
    ///
    /// An explicit path that cannot be read or parsed is an error; a missing or
    /// broken default file falls back to defaults with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    ArenaError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml(&contents)
                    .map_err(|e| ArenaError::Config(format!("{}: {e}", path.display())))
            }
            None => Ok(Self::load_default()),
        }
    }

    fn load_default() -> Self {
        let path = Self::config_path();

        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::from_toml(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_toml(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gomoku-arena")
            .join("config.toml")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            engine: ProgramSpec::new(&self.engine_path),
            reply_timeout: self.request_timeout(),
            log_capacity: self.log_capacity,
        }
    }

    /// Check the paths the service cannot run without
    pub fn validate(&self) -> Result<()> {
        if !self.engine_path.is_file() {
            return Err(ArenaError::Config(format!(
                "engine not found at {}",
                self.engine_path.display()
            )));
        }
        if !self.models_dir.is_dir() {
            return Err(ArenaError::Config(format!(
                "models directory not found at {}",
                self.models_dir.display()
            )));
        }
        if self.current_model.trim().is_empty() {
            return Err(ArenaError::Config("current_model is empty".to_string()));
        }
        Ok(())
    }
}
