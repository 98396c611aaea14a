//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Extraction call settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Vision provider: "gemini", "openai" or "ollama"
    pub provider: String,

    /// Fixed pause between items, in milliseconds
    pub request_delay_ms: u64,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Maximum tokens the model may generate per card
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            request_delay_ms: 2000,
            timeout_ms: 60_000,
            max_tokens: 1024,
            temperature: 0.0,
        }
    }
}

/// Image source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Recognized image extensions for local folders (case-insensitive)
    pub supported_formats: Vec<String>,

    /// Page size for Drive folder listing
    pub drive_page_size: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
            ],
            drive_page_size: 1000,
        }
    }
}

/// Google Drive and Sheets settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Path to the service-account JSON key (supports ${ENV_VAR} and ~)
    pub service_account_file: String,

    /// Drive folder holding the card images (supports ${ENV_VAR})
    pub drive_folder_id: String,

    /// Title of the spreadsheet receiving rows
    pub sheet_title: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            service_account_file: "${SERVICE_ACCOUNT_FILE}".to_string(),
            drive_folder_id: "${DRIVE_FOLDER_ID}".to_string(),
            sheet_title: "Business Card Data Extractor".to_string(),
        }
    }
}

/// CSV export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File the local-mode CSV is written to
    pub csv_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_file: "extracted_business_cards.csv".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Vision provider configurations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmConfig {
    /// Google Gemini configuration
    pub gemini: Option<GeminiConfig>,

    /// OpenAI configuration
    pub openai: Option<OpenAiConfig>,

    /// Ollama (local) configuration
    pub ollama: Option<OllamaConfig>,
}

/// Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
            model: "gemini-2.5-flash-lite".to_string(),
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama API endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2-vision".to_string(),
        }
    }
}
