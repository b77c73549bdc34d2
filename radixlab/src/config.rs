/*!
Configuration management for the radixlab command-line tool.
*/

use serde::{Deserialize, Serialize};
use std::path::Path;
use anyhow::{Context, Result};
use tracing::warn;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default log level (error, warn, info, debug, trace)
    pub log_level: String,

    pub output: OutputConfig,
    pub bits: BitsConfig,
}

impl AppConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            log_level: "warn".to_string(),
            output: OutputConfig::default(),
            bits: BitsConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::new());
        }

        Self::load_from_file(path)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Group width actually used for bit display
    pub fn group_width(&self) -> usize {
        if self.bits.group_width == 0 {
            warn!("bits.group_width = 0, printing bits ungrouped");
        }
        self.bits.group_width
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Output specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Text or JSON output
    pub format: OutputFormat,

    /// Always print derivation traces after a conversion
    pub explain: bool,

    /// Render traces with <sup>/<sub> markup instead of plain text
    pub html: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            explain: false,
            html: false,
        }
    }
}

/// Bit manipulator specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitsConfig {
    /// Bits per display group (0 disables grouping)
    pub group_width: usize,

    /// Print the bit string alongside the derived values
    pub show_binary: bool,
}

impl Default for BitsConfig {
    fn default() -> Self {
        Self {
            group_width: radix_core::word::BYTE_BITS,
            show_binary: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_roundtrip() {
        let mut original_config = AppConfig::new();
        original_config.output.format = OutputFormat::Json;
        original_config.bits.group_width = 4;

        let temp_file = NamedTempFile::new().unwrap();
        let temp_path = temp_file.path();

        // Save and load
        original_config.save_to_file(temp_path).unwrap();
        let loaded_config = AppConfig::load_from_file(temp_path).unwrap();

        assert_eq!(original_config, loaded_config);
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::new();

        assert_eq!(config.log_level, "warn");
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(!config.output.explain);
        assert!(!config.output.html);
        assert_eq!(config.bits.group_width, 8);
        assert!(config.bits.show_binary);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str("[output]\nexplain = true\n").unwrap();
        assert!(config.output.explain);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.bits.group_width, 8);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::new());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "output = [").unwrap();
        assert!(AppConfig::load_or_default(temp_file.path()).is_err());
    }
}
