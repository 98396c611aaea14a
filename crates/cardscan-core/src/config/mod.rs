//! Configuration management for cardscan.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. A [`RunConfig`] is then built once per run from the loaded
//! [`Config`] plus command-line overrides and handed to the adapters.

mod run;
mod types;
mod validate;

pub use run::{RunConfig, RunMode};
pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for cardscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extraction call settings
    pub extraction: ExtractionConfig,

    /// Image source settings
    pub source: SourceConfig,

    /// Google Drive / Sheets settings
    pub google: GoogleConfig,

    /// CSV export settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Vision provider settings
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.cardscan.cardscan/config.toml
    /// - Linux: ~/.config/cardscan/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\cardscan\config\config.toml
    ///
    /// Falls back to ~/.cardscan/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "cardscan", "cardscan")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".cardscan").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
///
/// Empty strings and unset variables resolve to `None`.
pub fn resolve_env_var(value: &str) -> Option<String> {
    let resolved = if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()?
    } else {
        value.to_string()
    };
    if resolved.trim().is_empty() {
        None
    } else {
        Some(resolved)
    }
}

/// Resolve a path setting: `${ENV_VAR}` first, then `~` expansion.
pub fn resolve_path(value: &str) -> Option<PathBuf> {
    let raw = resolve_env_var(value)?;
    Some(PathBuf::from(shellexpand::tilde(&raw).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.extraction.provider, "gemini");
        assert_eq!(config.extraction.request_delay_ms, 2000);
        assert_eq!(config.source.supported_formats.len(), 4);
        assert_eq!(config.google.sheet_title, "Business Card Data Extractor");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[extraction]"));
        assert!(toml.contains("[google]"));
    }

    #[test]
    fn test_load_from_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[extraction]\nrequest_delay_ms = 500\n\n[llm.gemini]\nendpoint = \"http://x\"\napi_key = \"k\"\nmodel = \"m\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.extraction.request_delay_ms, 500);
        assert_eq!(config.extraction.provider, "gemini");
        assert_eq!(config.llm.gemini.unwrap().model, "m");
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[extraction]\ntimeout_ms = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_resolve_env_var() {
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        assert_eq!(resolve_env_var(""), None);
        assert_eq!(resolve_env_var("   "), None);
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_CARDSCAN_123}"), None);
    }

    #[test]
    fn test_resolve_path_expands_tilde() {
        let path = resolve_path("~/cards/key.json").unwrap();
        assert!(path.ends_with("cards/key.json"));
        assert_eq!(resolve_path("${DEFINITELY_NOT_SET_CARDSCAN_456}"), None);
    }
}
