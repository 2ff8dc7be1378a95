// src/models.rs
// Catalog of selectable AI executables in the models directory

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{ArenaError, Result};
use crate::spawner::ProgramSpec;

/// Listing returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct ModelListing {
    pub current: String,
    pub available: Vec<String>,
}

/// AI executables available to new sessions, plus the current selection
pub struct ModelCatalog {
    dir: PathBuf,
    current: RwLock<String>,
}

impl ModelCatalog {
    pub fn new(dir: impl Into<PathBuf>, current: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            current: RwLock::new(current.into()),
        }
    }

    pub async fn current(&self) -> String {
        self.current.read().await.clone()
    }

    /// Resolve a model name to the executable inside the models directory.
    ///
    /// Names are plain file names; anything that could walk out of the
    /// directory is rejected.
    pub async fn resolve(&self, name: &str) -> Result<ProgramSpec> {
        if !is_plain_name(name) {
            return Err(ArenaError::UnknownModel(name.to_string()));
        }
        let path = self.dir.join(name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(ProgramSpec::new(path)),
            _ => Err(ArenaError::UnknownModel(name.to_string())),
        }
    }

    /// Resolve `requested`, or the current selection when absent
    pub async fn resolve_or_current(&self, requested: Option<&str>) -> Result<(String, ProgramSpec)> {
        let name = match requested {
            Some(name) => name.to_string(),
            None => self.current().await,
        };
        let spec = self.resolve(&name).await?;
        Ok((name, spec))
    }

    /// Make `name` the model used by future sessions
    pub async fn select(&self, name: &str) -> Result<()> {
        self.resolve(name).await?;
        *self.current.write().await = name.to_string();
        info!(model = name, "Selected model");
        Ok(())
    }

    /// Sorted file names of executables in the models directory
    pub async fn available(&self) -> Result<Vec<String>> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || scan_executables(&dir)).await?
    }

    pub async fn listing(&self) -> Result<ModelListing> {
        Ok(ModelListing {
            current: self.current().await,
            available: self.available().await?,
        })
    }
}

fn scan_executables(dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ArenaError::Config(format!("cannot list {}: {e}", dir.display())))?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| is_executable(&entry.path()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    Ok(names)
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
