//! # Config Loader
//!
//! Configuration loading and parsing.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a ready-to-use `HeraldConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("slot-herald.toml")).unwrap();
//! println!("Channel: {}", config.telegram.channel);
//! ```

mod parser;
mod validator;

pub use contracts::HeraldConfig;
pub use parser::ConfigFormat;

use contracts::HeraldError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file path.
    ///
    /// The format is detected from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<HeraldConfig, HeraldError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from a string.
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<HeraldConfig, HeraldError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Serialize a configuration to TOML.
    pub fn to_toml(config: &HeraldConfig) -> Result<String, HeraldError> {
        toml::to_string_pretty(config)
            .map_err(|e| HeraldError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a configuration to JSON.
    pub fn to_json(config: &HeraldConfig) -> Result<String, HeraldError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| HeraldError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer the configuration format from the file extension.
    fn detect_format(path: &Path) -> Result<ConfigFormat, HeraldError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            HeraldError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| HeraldError::config_parse(format!("unsupported config format: .{ext}")))
    }

    fn read_file(path: &Path) -> Result<String, HeraldError> {
        Ok(std::fs::read_to_string(path)?)
    }
}
