use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Which macOS terminal application receives the session. Ignored on other
/// platforms, where the emulator is probed at dispatch time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TerminalType {
    #[default]
    #[serde(rename = "iterm2")]
    ITerm2,
    #[serde(rename = "terminal")]
    Terminal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TerminalSettings {
    #[serde(default)]
    pub r#type: TerminalType,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub terminal: TerminalSettings,
}

pub const APP_SETTINGS_FILE: &str = "sync-no-ci.yaml";

pub fn default_app_settings() -> AppSettings {
    AppSettings::default()
}

pub fn load_app_settings(dir: &Path) -> Result<(AppSettings, PathBuf)> {
    let path = dir.join(APP_SETTINGS_FILE);
    if !path.exists() {
        return Ok((default_app_settings(), path));
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed reading app settings {}", path.display()))?;
    let settings: AppSettings = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed parsing app settings {}", path.display()))?;
    Ok((settings, path))
}

pub fn save_app_settings(dir: &Path, settings: &AppSettings) -> Result<()> {
    let path = dir.join(APP_SETTINGS_FILE);
    let yaml = serde_yaml::to_string(settings)?;
    let header = "# sync-no-ci App Settings\n# This file is auto-generated. Edit carefully.\n\n";
    fs::create_dir_all(dir)?;
    fs::write(&path, format!("{}{}", header, yaml))
        .with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (settings, path) = load_app_settings(dir.path()).unwrap();
        assert_eq!(settings.terminal.r#type, TerminalType::ITerm2);
        assert!(!path.exists());
    }

    #[test]
    fn settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings {
            terminal: TerminalSettings {
                r#type: TerminalType::Terminal,
            },
        };
        save_app_settings(dir.path(), &settings).unwrap();
        let (loaded, path) = load_app_settings(dir.path()).unwrap();
        assert_eq!(loaded.terminal.r#type, TerminalType::Terminal);
        assert!(path.exists());
    }
}
