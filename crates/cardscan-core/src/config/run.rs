//! Per-run configuration, built once at bootstrap and validated before any work.

use std::path::PathBuf;
use std::time::Duration;

use super::{resolve_env_var, Config, ExtractionConfig, LlmConfig, SourceConfig};
use crate::error::ConfigError;

/// Where images come from, and therefore where rows go.
#[derive(Debug, Clone)]
pub enum RunMode {
    /// Drive folder in, Google Sheet out
    Drive {
        folder_id: Option<String>,
        sheet_title: Option<String>,
        service_account_file: Option<PathBuf>,
    },
    /// Local directory in, CSV file out
    Local {
        dir: Option<PathBuf>,
        output: PathBuf,
    },
}

/// Explicit configuration value for one extraction run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Vision provider name ("gemini", "openai", "ollama")
    pub provider: String,

    /// Model override for the selected provider
    pub model: Option<String>,

    /// Session API key; takes precedence over the provider config
    pub api_key: Option<String>,

    /// Source and sink selection
    pub mode: RunMode,

    /// Provider settings from the config file
    pub llm: LlmConfig,

    /// Extraction call settings
    pub extraction: ExtractionConfig,

    /// Source listing settings
    pub source: SourceConfig,
}

impl RunConfig {
    /// Start from the loaded config for the given mode.
    pub fn new(config: &Config, mode: RunMode) -> Self {
        Self {
            provider: config.extraction.provider.clone(),
            model: None,
            api_key: None,
            mode,
            llm: config.llm.clone(),
            extraction: config.extraction.clone(),
            source: config.source.clone(),
        }
    }

    /// Fixed pause between items.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.extraction.request_delay_ms)
    }

    /// Whether the selected provider needs an API key.
    pub fn requires_api_key(&self) -> bool {
        self.provider != "ollama"
    }

    /// The API key for the selected provider: session key first, then config.
    pub fn resolved_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_deref().and_then(resolve_env_var) {
            return Some(key);
        }
        let configured = match self.provider.as_str() {
            "gemini" => self.llm.gemini.clone().unwrap_or_default().api_key,
            "openai" => self.llm.openai.clone().unwrap_or_default().api_key,
            _ => return None,
        };
        resolve_env_var(&configured)
    }

    /// Provider config with the session key injected, ready for the factory.
    pub fn llm_config(&self) -> LlmConfig {
        let mut llm = self.llm.clone();
        if let Some(key) = self.api_key.as_deref().and_then(resolve_env_var) {
            match self.provider.as_str() {
                "gemini" => llm.gemini.get_or_insert_with(Default::default).api_key = key,
                "openai" => llm.openai.get_or_insert_with(Default::default).api_key = key,
                _ => {}
            }
        }
        llm
    }

    /// Check that every value this run needs is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.provider.as_str(), "gemini" | "openai" | "ollama") {
            return Err(ConfigError::ValidationError(format!(
                "unknown provider '{}' (expected gemini, openai or ollama)",
                self.provider
            )));
        }

        if self.requires_api_key() && self.resolved_api_key().is_none() {
            let var = match self.provider.as_str() {
                "openai" => "OPENAI_API_KEY",
                _ => "GEMINI_API_KEY",
            };
            return Err(ConfigError::Missing(format!(
                "{} API key (set {var} or pass --api-key)",
                self.provider
            )));
        }

        match &self.mode {
            RunMode::Drive {
                folder_id,
                sheet_title,
                service_account_file,
            } => {
                if is_blank(folder_id.as_deref()) {
                    return Err(ConfigError::Missing("Drive folder ID".into()));
                }
                if is_blank(sheet_title.as_deref()) {
                    return Err(ConfigError::Missing("Google Sheet title".into()));
                }
                if service_account_file.is_none() {
                    return Err(ConfigError::Missing(
                        "service account file (set SERVICE_ACCOUNT_FILE or pass --service-account)"
                            .into(),
                    ));
                }
            }
            RunMode::Local { dir, .. } => {
                if dir.as_ref().map_or(true, |d| d.as_os_str().is_empty()) {
                    return Err(ConfigError::Missing("local folder path".into()));
                }
            }
        }

        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeminiConfig;

    fn local_run(dir: Option<&str>) -> RunConfig {
        let mut config = Config::default();
        config.llm.gemini = Some(GeminiConfig {
            api_key: "AIza-test".into(),
            ..Default::default()
        });
        RunConfig::new(
            &config,
            RunMode::Local {
                dir: dir.map(PathBuf::from),
                output: PathBuf::from("out.csv"),
            },
        )
    }

    #[test]
    fn test_local_run_with_folder_is_valid() {
        assert!(local_run(Some("/cards")).validate().is_ok());
    }

    #[test]
    fn test_local_run_without_folder_is_rejected() {
        let err = local_run(None).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(err.to_string().contains("local folder"));
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let mut run = local_run(Some("/cards"));
        run.llm.gemini = Some(GeminiConfig {
            api_key: "${DEFINITELY_NOT_SET_CARDSCAN_789}".into(),
            ..Default::default()
        });
        let err = run.validate().unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_session_key_overrides_config() {
        let mut run = local_run(Some("/cards"));
        run.api_key = Some("session-key".into());
        assert_eq!(run.resolved_api_key().as_deref(), Some("session-key"));
        assert_eq!(run.llm_config().gemini.unwrap().api_key, "session-key");
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let mut run = local_run(Some("/cards"));
        run.provider = "ollama".into();
        run.llm.gemini = None;
        assert!(!run.requires_api_key());
        assert!(run.validate().is_ok());
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let mut run = local_run(Some("/cards"));
        run.provider = "claude".into();
        let err = run.validate().unwrap_err();
        assert!(err.to_string().contains("unknown provider"));
    }

    #[test]
    fn test_drive_run_requires_folder_title_and_credentials() {
        let mut run = local_run(None);
        run.mode = RunMode::Drive {
            folder_id: Some("  ".into()),
            sheet_title: Some("Cards".into()),
            service_account_file: Some(PathBuf::from("sa.json")),
        };
        assert!(run.validate().unwrap_err().to_string().contains("folder ID"));

        run.mode = RunMode::Drive {
            folder_id: Some("abc".into()),
            sheet_title: None,
            service_account_file: Some(PathBuf::from("sa.json")),
        };
        assert!(run.validate().unwrap_err().to_string().contains("Sheet title"));

        run.mode = RunMode::Drive {
            folder_id: Some("abc".into()),
            sheet_title: Some("Cards".into()),
            service_account_file: None,
        };
        assert!(run.validate().unwrap_err().to_string().contains("service account"));

        run.mode = RunMode::Drive {
            folder_id: Some("abc".into()),
            sheet_title: Some("Cards".into()),
            service_account_file: Some(PathBuf::from("sa.json")),
        };
        assert!(run.validate().is_ok());
    }

    #[test]
    fn test_request_delay_from_config() {
        let mut run = local_run(Some("/cards"));
        run.extraction.request_delay_ms = 250;
        assert_eq!(run.request_delay(), Duration::from_millis(250));
    }
}
