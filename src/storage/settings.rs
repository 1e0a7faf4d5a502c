//! Settings persistence.
//!
//! Handles saving and loading the settings file to/from disk.
//! Cross-platform: uses the appropriate config directory for each OS.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::device::NbfcUtility;
use crate::error::{FanControlError, Result};
use crate::protocol::{DEFAULT_BINARY, fallback_profiles};

// =============================================================================
// Config Path
// =============================================================================

const APP_NAME: &str = "nbfc-gui";
const CONFIG_FILE: &str = "config.json";

/// Get the configuration directory path.
/// - Linux: ~/.config/nbfc-gui/
/// - Windows: %APPDATA%\nbfc-gui\
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .ok_or_else(|| FanControlError::Config("Could not find config directory".into()))
}

/// Get the full path to the config file.
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

// =============================================================================
// Storage Structures
// =============================================================================

/// How to reach the utility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilityConfig {
    /// Binary name looked up on PATH, or an explicit path.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Upper bound for one invocation in seconds. `null` waits forever.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: Option<u64>,
}

fn default_binary() -> String {
    DEFAULT_BINARY.to_string()
}

fn default_command_timeout() -> Option<u64> {
    Some(10)
}

impl Default for UtilityConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

/// Main configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub utility: UtilityConfig,

    /// Offered during setup when the utility recommends nothing.
    #[serde(default = "default_fallback_profiles")]
    pub fallback_profiles: Vec<String>,

    /// Percentage moved by one `+`/`-` on the slider.
    #[serde(default = "default_slider_step")]
    pub slider_step: u8,
}

fn default_fallback_profiles() -> Vec<String> {
    fallback_profiles()
}

fn default_slider_step() -> u8 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            utility: UtilityConfig::default(),
            fallback_profiles: default_fallback_profiles(),
            slider_step: default_slider_step(),
        }
    }
}

impl AppConfig {
    pub fn command_timeout(&self) -> Option<Duration> {
        self.utility.command_timeout_secs.map(Duration::from_secs)
    }

    /// Build the process client described by these settings.
    pub fn utility_client(&self) -> NbfcUtility {
        NbfcUtility::new(self.utility.binary.clone()).with_timeout(self.command_timeout())
    }

    /// Fallback list, never empty.
    pub fn effective_fallback(&self) -> Vec<String> {
        if self.fallback_profiles.is_empty() {
            fallback_profiles()
        } else {
            self.fallback_profiles.clone()
        }
    }
}

// =============================================================================
// Storage Functions
// =============================================================================

/// Load configuration from the default location.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&get_config_path()?)
}

/// Load configuration from `path`; a missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| FanControlError::Config(format!("Failed to read config: {}", e)))?;

    serde_json::from_str(&content)
        .map_err(|e| FanControlError::Config(format!("Failed to parse config: {}", e)))
}

/// Save configuration to `path`, creating parent directories.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| {
            FanControlError::Config(format!("Failed to create config dir: {}", e))
        })?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| FanControlError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(path, content)
        .map_err(|e| FanControlError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}

/// Ensure that the configuration file exists, writing defaults if it does not.
/// Returns the path.
pub fn ensure_config_exists() -> Result<PathBuf> {
    let path = get_config_path()?;
    ensure_config_at(&path)?;
    Ok(path)
}

/// Write the defaults to `path` unless a file is already there.
/// Returns true if a file was created.
pub fn ensure_config_at(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    tracing::info!("Config file not found, creating default at {}", path.display());
    save_config_to(path, &AppConfig::default())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.utility.binary, "nbfc");
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_ensure_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        assert!(ensure_config_at(&path).unwrap());
        assert!(!ensure_config_at(&path).unwrap());
        assert_eq!(load_config_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "utility": { "binary": "/opt/nbfc/bin/nbfc" } }"#).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.utility.binary, "/opt/nbfc/bin/nbfc");
        assert_eq!(config.utility.command_timeout_secs, Some(10));
        assert_eq!(config.slider_step, 5);
        assert_eq!(config.fallback_profiles[0], "Generic");
    }

    #[test]
    fn test_null_timeout_is_unbounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "utility": { "command_timeout_secs": null } }"#).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.command_timeout(), None);
        assert_eq!(config.utility_client().timeout(), None);
    }

    #[test]
    fn test_saved_changes_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.slider_step = 10;
        config.fallback_profiles = vec!["Framework".into()];
        save_config_to(&path, &config).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            load_config_from(&path),
            Err(FanControlError::Config(_))
        ));
    }

    #[test]
    fn test_empty_fallback_uses_builtin() {
        let config = AppConfig {
            fallback_profiles: Vec::new(),
            ..AppConfig::default()
        };
        assert_eq!(config.effective_fallback(), fallback_profiles());
    }
}
