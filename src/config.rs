//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_KEYMAP_DIR, DEFAULT_KEYMAP_NAME, MAP_NAME_MAX_LEN};

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "KEYMAPCTL_CONFIG_DIR";

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Directory holding keymap definition files (e.g., "/res/keymaps")
    pub keymap_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            keymap_dir: PathBuf::from(DEFAULT_KEYMAP_DIR),
        }
    }
}

/// Keyboard preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardConfig {
    /// Keymap used when a command is given no name
    pub default_keymap: String,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            default_keymap: DEFAULT_KEYMAP_NAME.to_string(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/Keymapctl/config.toml`
/// - macOS: `~/Library/Application Support/Keymapctl/config.toml`
/// - Windows: `%APPDATA%\Keymapctl\config.toml`
///
/// `KEYMAPCTL_CONFIG_DIR` replaces the directory when set.
///
/// # Validation
///
/// - `keymap_dir` must not be empty
/// - `default_keymap` must be a non-empty name of at most 50 bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Keyboard preferences
    #[serde(default)]
    pub keyboard: KeyboardConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the config directory path.
    ///
    /// - Linux: `~/.config/Keymapctl/`
    /// - macOS: `~/Library/Application Support/Keymapctl/`
    /// - Windows: `%APPDATA%\Keymapctl\`
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("Keymapctl");

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from `path`, returning defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `path` via a temp file and rename.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create config directory: {}", dir.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, content).with_context(|| {
            format!("Failed to write temp config file: {}", temp_path.display())
        })?;

        fs::rename(&temp_path, path).with_context(|| {
            format!("Failed to rename temp config file to: {}", path.display())
        })?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.paths.keymap_dir.as_os_str().is_empty() {
            anyhow::bail!("Keymap directory must not be empty");
        }

        let name = &self.keyboard.default_keymap;
        if name.is_empty() {
            anyhow::bail!("Default keymap name must not be empty");
        }
        if name.len() > MAP_NAME_MAX_LEN {
            anyhow::bail!(
                "Default keymap name is {} bytes long, the limit is {MAP_NAME_MAX_LEN}",
                name.len()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.paths.keymap_dir, PathBuf::from("/res/keymaps"));
        assert_eq!(config.keyboard.default_keymap, "en-us");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_rejects_long_default() {
        let mut config = Config::new();
        config.keyboard.default_keymap = "k".repeat(51);
        assert!(config.validate().is_err());

        config.keyboard.default_keymap = "k".repeat(50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_rejects_empty_values() {
        let mut config = Config::new();
        config.keyboard.default_keymap.clear();
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.paths.keymap_dir = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.paths.keymap_dir = temp_dir.path().join("keymaps");
        config.keyboard.default_keymap = "de".to_string();
        config.save_to(&config_file).unwrap();

        assert!(!config_file.with_extension("toml.tmp").exists());
        let loaded = Config::load_from(&config_file).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_config_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(&config_file, "[keyboard]\ndefault_keymap = \"fr\"\n").unwrap();

        let loaded = Config::load_from(&config_file).unwrap();
        assert_eq!(loaded.keyboard.default_keymap, "fr");
        assert_eq!(loaded.paths, PathConfig::default());
    }
}
