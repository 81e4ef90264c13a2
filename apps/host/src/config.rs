//! Host configuration.
//!
//! Stored as TOML at `$TRAYBRIDGE_CONFIG` when set, otherwise:
//! - Linux: `~/.config/traybridge/host.toml`
//! - Windows: `%APPDATA%/traybridge/host.toml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use traybridge_bridge::ExtensionConfig;

/// Host configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether the headless card presenter has an attachment point.
    #[serde(default = "default_true")]
    pub headless_attached: bool,

    #[serde(default)]
    pub extension: ExtensionConfig,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            headless_attached: default_true(),
            extension: ExtensionConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from disk, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Returns the configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("TRAYBRIDGE_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("traybridge").join("host.toml"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("traybridge")
            .join("host.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert!(config.headless_attached);
        assert_eq!(config.extension, ExtensionConfig::default());
    }

    #[test]
    fn config_partial_toml() {
        let toml_str = r#"
            log_level = "debug"

            [extension]
            default_tooltip = "My App"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(config.headless_attached);
        assert_eq!(config.extension.name, "tray");
        assert_eq!(config.extension.default_tooltip.as_deref(), Some("My App"));
    }

    #[test]
    fn config_roundtrip_toml() {
        let mut config = Config::default();
        config.headless_attached = false;
        config.extension.event_capacity = 32;
        config.extension.default_card_auto_close_ms = Some(3000);

        let parsed: Config = toml::from_str(&toml::to_string_pretty(&config).unwrap()).unwrap();
        assert!(!parsed.headless_attached);
        assert_eq!(parsed.extension, config.extension);
    }

    #[test]
    fn load_creates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("host.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn load_reads_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("host.toml");
        std::fs::write(&path, "headless_attached = false\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(!config.headless_attached);
    }

    #[test]
    fn config_path_not_empty() {
        let path = config_path().unwrap();
        assert!(path.to_string_lossy().ends_with(".toml") || std::env::var("TRAYBRIDGE_CONFIG").is_ok());
    }
}
