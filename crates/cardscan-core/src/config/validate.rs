//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.extraction.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "extraction.timeout_ms must be > 0".into(),
            ));
        }
        if self.extraction.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "extraction.max_tokens must be > 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.extraction.temperature) {
            return Err(ConfigError::ValidationError(
                "extraction.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.source.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "source.supported_formats must not be empty".into(),
            ));
        }
        if !(1..=1000).contains(&self.source.drive_page_size) {
            return Err(ConfigError::ValidationError(
                "source.drive_page_size must be between 1 and 1000".into(),
            ));
        }
        Ok(())
    }
}
