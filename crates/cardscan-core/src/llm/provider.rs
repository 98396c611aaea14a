//! Vision provider trait and request/response types.
//!
//! Defines the interface that all vision providers implement, plus the
//! factory that creates the right provider from the run configuration.

use crate::config::{resolve_env_var, LlmConfig};
use crate::error::ProviderError;
use async_trait::async_trait;
use base64::Engine;
use serde_json::Value;
use std::time::Duration;

use super::prompt::{contact_schema, SYSTEM_INSTRUCTION, USER_PROMPT};

/// Base64-encoded image ready to send to a vision API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format.to_lowercase().as_str() {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "heic" => "image/heic",
            other => {
                tracing::debug!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Create an `ImageInput`, taking the format from a file name's extension.
    pub fn for_file(bytes: &[u8], file_name: &str) -> Self {
        let format = std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        Self::from_bytes(bytes, format)
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A single call to a vision model.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// System instruction, if any
    pub system: Option<String>,
    /// User prompt text
    pub prompt: String,
    /// The image, absent for text-only probes
    pub image: Option<ImageInput>,
    /// JSON Schema the response must follow
    pub response_schema: Option<Value>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl VisionRequest {
    /// Build the business-card extraction request for one image.
    pub fn extract_card(image: ImageInput, max_tokens: u32, temperature: f32) -> Self {
        Self {
            system: Some(SYSTEM_INSTRUCTION.to_string()),
            prompt: USER_PROMPT.to_string(),
            image: Some(image),
            response_schema: Some(contact_schema()),
            max_tokens,
            temperature,
        }
    }

    /// Minimal text-only request used to probe remaining quota.
    pub fn ping() -> Self {
        Self {
            system: None,
            prompt: "Say 'OK' in one word.".to_string(),
            image: None,
            response_schema: None,
            max_tokens: 8,
            temperature: 0.0,
        }
    }
}

/// The response from a vision call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Generated text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all vision providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn VisionProvider>` for dynamic dispatch).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini", "ollama").
    fn name(&self) -> &str;

    /// Send one request and return the raw generated text.
    async fn generate(&self, request: &VisionRequest) -> Result<ProviderResponse, ProviderError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Factory that creates the appropriate provider from config.
pub struct VisionProviderFactory;

impl VisionProviderFactory {
    /// Create a vision provider based on provider name, config, and optional model override.
    ///
    /// # Arguments
    /// * `provider` - Provider identifier ("gemini", "openai", "ollama")
    /// * `config` - The full LLM config section
    /// * `model_override` - Optional model name that overrides the config default
    /// * `timeout` - Per-request timeout
    pub fn create(
        provider: &str,
        config: &LlmConfig,
        model_override: Option<&str>,
        timeout: Duration,
    ) -> Result<Box<dyn VisionProvider>, ProviderError> {
        match provider {
            "gemini" => {
                let cfg = config.gemini.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ProviderError::NotConfigured(
                        "Gemini API key not set. Set GEMINI_API_KEY env var.".to_string(),
                    )
                })?;
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(
                    super::gemini::GeminiProvider::new(&cfg.endpoint, &api_key, &model)
                        .with_timeout(timeout),
                ))
            }
            "openai" => {
                let cfg = config.openai.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ProviderError::NotConfigured(
                        "OpenAI API key not set. Set OPENAI_API_KEY env var.".to_string(),
                    )
                })?;
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(
                    super::openai::OpenAiProvider::new(&cfg.endpoint, &api_key, &model)
                        .with_timeout(timeout),
                ))
            }
            "ollama" => {
                let cfg = config.ollama.clone().unwrap_or_default();
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(
                    super::ollama::OllamaProvider::new(&cfg.endpoint, &model).with_timeout(timeout),
                ))
            }
            other => Err(ProviderError::NotConfigured(format!(
                "Unknown vision provider: {other}"
            ))),
        }
    }
}
