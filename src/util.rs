use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

/// Return the platform-appropriate data directory for sync-no-ci.
/// - macOS: ~/.sync-no-ci
/// - Linux: ~/.local/share/sync-no-ci (or $XDG_DATA_HOME/sync-no-ci)
/// - Windows: %APPDATA%\\SyncNoCi
pub fn data_dir() -> Result<PathBuf> {
    let os = env::consts::OS;
    let base = match os {
        "macos" => dirs_home().map(|h| h.join(".sync-no-ci")),
        "windows" => {
            if let Ok(appdata) = env::var("APPDATA") {
                Some(PathBuf::from(appdata).join("SyncNoCi"))
            } else {
                dirs_home().map(|h| h.join("AppData").join("Roaming").join("SyncNoCi"))
            }
        }
        _ => {
            if let Ok(xdg) = env::var("XDG_DATA_HOME") {
                Some(PathBuf::from(xdg).join("sync-no-ci"))
            } else {
                dirs_home().map(|h| h.join(".local").join("share").join("sync-no-ci"))
            }
        }
    };

    base.ok_or_else(|| anyhow::anyhow!("could not resolve home directory"))
}

fn dirs_home() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Convert an absolute path into a display-friendly path. On unix, replaces the home directory with "~".
pub fn display_path(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    if let Some(home) = dirs_home() {
        if let Ok(rel) = path.strip_prefix(&home) {
            return format!("~/{}", rel.display());
        }
    }
    path.display().to_string()
}
