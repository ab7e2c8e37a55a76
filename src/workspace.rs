use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const REGISTRY_FILE: &str = "workspaces.yaml";

/// The one failure the dispatch flow can detect itself. Everything after the
/// terminal session exists is out of our hands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("no workspace open")]
    NoWorkspaceOpen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceEntry {
    pub path: String,
    #[serde(default = "Utc::now")]
    pub opened_at: DateTime<Utc>,
}

/// Ordered set of open workspace roots. The front entry is the effective
/// root: `sync` always acts on the most recently opened workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub workspaces: Vec<WorkspaceEntry>,
}

impl Registry {
    /// The workspace root `sync` will act on.
    pub fn first_root(&self) -> Result<&str, WorkspaceError> {
        self.workspaces
            .first()
            .map(|w| w.path.as_str())
            .ok_or(WorkspaceError::NoWorkspaceOpen)
    }

    /// Register `path` as the frontmost workspace. Re-opening a known path
    /// moves it to the front instead of duplicating it.
    pub fn open(&mut self, path: &str) {
        self.workspaces.retain(|w| w.path != path);
        self.workspaces.insert(
            0,
            WorkspaceEntry {
                path: path.to_string(),
                opened_at: Utc::now(),
            },
        );
    }

    /// Unregister `path`. Returns false if it was not open.
    pub fn close(&mut self, path: &str) -> bool {
        let before = self.workspaces.len();
        self.workspaces.retain(|w| w.path != path);
        self.workspaces.len() != before
    }
}

pub fn load(dir: &Path) -> Result<Registry> {
    let path = dir.join(REGISTRY_FILE);
    if !path.exists() {
        return Ok(Registry::default());
    }
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed reading workspace registry {}", path.display()))?;
    let registry: Registry = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed parsing workspace registry {}", path.display()))?;
    Ok(registry)
}

pub fn save(dir: &Path, registry: &Registry) -> Result<()> {
    let path = dir.join(REGISTRY_FILE);
    let yaml = serde_yaml::to_string(registry)?;
    fs::create_dir_all(dir)?;
    fs::write(&path, yaml).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}
