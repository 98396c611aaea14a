//! CLI enum types and shared provider options.

use clap::{Args, ValueEnum};

/// Supported vision providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// Google Gemini API
    Gemini,
    /// OpenAI API
    Openai,
    /// Local Ollama instance
    Ollama,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::Openai => write!(f, "openai"),
            ProviderKind::Ollama => write!(f, "ollama"),
        }
    }
}

/// Vision provider selection, shared by `extract` and `check`.
#[derive(Args, Debug, Clone, Default)]
pub struct ProviderArgs {
    /// Vision provider (defaults to `extraction.provider` from config)
    #[arg(long, value_enum, global = true)]
    pub provider: Option<ProviderKind>,

    /// Model name (provider-specific)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// API key for the selected provider, for this session only
    #[arg(long, env = "CARDSCAN_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,
}

/// Whether an API key has the shape the provider issues.
///
/// Only a cheap prefix check; the key may still be revoked.
pub fn key_looks_valid(provider: &str, key: &str) -> bool {
    match provider {
        "gemini" => key.starts_with("AIza"),
        "openai" => key.starts_with("sk-"),
        _ => !key.trim().is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_display_matches_config_names() {
        assert_eq!(ProviderKind::Gemini.to_string(), "gemini");
        assert_eq!(ProviderKind::Openai.to_string(), "openai");
        assert_eq!(ProviderKind::Ollama.to_string(), "ollama");
    }

    #[test]
    fn test_key_prefixes() {
        assert!(key_looks_valid("gemini", "AIzaSyExample"));
        assert!(!key_looks_valid("gemini", "sk-abc"));
        assert!(key_looks_valid("openai", "sk-abc"));
        assert!(!key_looks_valid("openai", ""));
    }
}
