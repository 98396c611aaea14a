//! Vision-model integration for business-card extraction.
//!
//! Provides a provider abstraction over several vision backends (Gemini,
//! OpenAI, Ollama) and the [`ExtractionClient`] that turns one image into one
//! [`crate::types::ExtractionRecord`] or a classified failure.

mod client;
mod gemini;
mod ollama;
mod openai;
mod prompt;
mod provider;
mod quota;

pub use client::{ExtractOptions, ExtractionClient};
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use prompt::{contact_schema, SYSTEM_INSTRUCTION, USER_PROMPT};
pub use provider::{ImageInput, ProviderResponse, VisionProvider, VisionProviderFactory, VisionRequest};
pub use quota::{classify, is_quota_exhausted};
