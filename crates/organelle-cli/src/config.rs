//! Configuration management for the Organelle CLI.

use anyhow::{Context, Result};
use organelle::prelude::{CompositeConfig, Format};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "organelle.toml";

/// Organelle project configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub composite: CompositeConfig,
    #[serde(default)]
    pub transcode: TranscodeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscodeConfig {
    #[serde(default)]
    pub default_format: Format,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

// Default value functions
fn default_pretty() -> bool { true }
fn default_level() -> String { "info".to_string() }

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            default_format: Format::default(),
            pretty: default_pretty(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Config {
    /// Load config from organelle.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Self::load_from(&cwd)
    }

    /// Load config from organelle.toml in `start` or its parents.
    pub fn load_from(start: &Path) -> Result<Self> {
        match find_config_file(start) {
            Some(path) => Self::read(&path),
            None => Ok(Config::default()),
        }
    }

    /// Read one specific config file.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Generate default config as TOML string.
    pub fn default_toml() -> Result<String> {
        Config::default().to_toml()
    }
}

/// Find organelle.toml in `start` or its parent directories.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_takes_every_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.composite.capacity_hint, 4);
        assert_eq!(config.transcode.default_format, Format::Kv);
        assert!(config.transcode.pretty);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            "[transcode]\ndefault_format = \"json\"\n\n[composite]\ncapacity_hint = 16\n",
        )
        .unwrap();
        assert_eq!(config.transcode.default_format, Format::Json);
        assert!(config.transcode.pretty);
        assert_eq!(config.composite.capacity_hint, 16);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn unknown_format_is_a_parse_error() {
        assert!(toml::from_str::<Config>("[transcode]\ndefault_format = \"yaml\"\n").is_err());
    }

    #[test]
    fn saved_config_is_found_from_a_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let mut config = Config::default();
        config.logging.level = "debug".into();
        config.save(&dir.path().join(CONFIG_FILE)).unwrap();

        assert_eq!(find_config_file(&nested), Some(dir.path().join(CONFIG_FILE)));
        assert_eq!(Config::load_from(&nested).unwrap(), config);
    }

    #[test]
    fn default_toml_parses_back() {
        let text = Config::default_toml().unwrap();
        assert!(text.contains("[composite]"));
        assert!(text.contains("default_format = \"kv\""));
        assert_eq!(toml::from_str::<Config>(&text).unwrap(), Config::default());
    }
}
