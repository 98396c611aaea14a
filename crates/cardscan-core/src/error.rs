//! Error types for the card extraction pipeline.
//!
//! Errors are split by concern so the controller can tell a run-ending
//! failure apart from one that only costs a single card. Only
//! [`ExtractionFailure::QuotaExhausted`] crosses the per-item boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors. All of these surface before a run starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A value required for this run was not supplied
    #[error("Missing required value: {0}")]
    Missing(String),
}

/// Raw failure reported by a vision provider, before classification.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The request never produced an HTTP response (DNS, connect, timeout)
    #[error("{provider} request failed: {message}")]
    Request { provider: String, message: String },

    /// The API answered with a non-success status
    #[error("{provider} HTTP {status}: {body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },

    /// The API answered 2xx but the envelope was unusable
    #[error("{provider} returned an invalid response: {message}")]
    InvalidResponse { provider: String, message: String },

    /// The provider cannot be constructed from the given configuration
    #[error("{0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// HTTP status code, when the failure came with one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Classified outcome of a failed extraction call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// The provider refused the call for rate or usage limits. Fatal to the run.
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    /// The call failed for any other reason. Costs only this card.
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// The call succeeded but the body was not the expected JSON object.
    #[error("Malformed model response: {message}")]
    MalformedResponse { message: String, raw: String },
}

impl ExtractionFailure {
    /// Whether this failure must stop the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExtractionFailure::QuotaExhausted(_))
    }
}

/// Image source errors.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The container or directory cannot be enumerated. Fatal to the run.
    #[error("Source unavailable: {locator}: {message}")]
    Unavailable { locator: String, message: String },

    /// A single item could not be fetched.
    #[error("Failed to fetch {item}: {message}")]
    Fetch { item: String, message: String },
}

/// Output sink errors.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The sink cannot be opened or prepared. Fatal before processing starts.
    #[error("Sink unavailable: {0}")]
    Unavailable(String),

    /// A single row could not be written. The row is lost.
    #[error("Failed to append row for {file_name}: {message}")]
    Append { file_name: String, message: String },

    /// The buffered rows could not be materialized.
    #[error("Failed to export rows: {0}")]
    Export(String),
}

/// Google service-account authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Failed to read the service-account key file
    #[error("Failed to read service account file {path}: {source}")]
    ReadKey {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Key file is not a valid service-account JSON document
    #[error("Invalid service account key: {0}")]
    InvalidKey(String),

    /// Signing the assertion failed
    #[error("Failed to sign token request: {0}")]
    Signing(String),

    /// The token endpoint rejected the exchange
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
}

/// Errors from the thin Drive and Sheets REST clients.
#[derive(Error, Debug)]
pub enum GoogleApiError {
    /// Could not obtain an access token
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Transport-level failure
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Endpoint URL could not be built
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors that end a run before any item is processed.
#[derive(Error, Debug)]
pub enum RunError {
    /// Listing the image source failed
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Preparing the output sink failed
    #[error(transparent)]
    Sink(#[from] SinkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_quota_is_fatal() {
        assert!(ExtractionFailure::QuotaExhausted("429".into()).is_fatal());
        assert!(!ExtractionFailure::ExtractionFailed("boom".into()).is_fatal());
        assert!(!ExtractionFailure::MalformedResponse {
            message: "eof".into(),
            raw: "{".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_status_code_only_for_http() {
        let err = ProviderError::Http {
            provider: "gemini".into(),
            status: 503,
            body: "unavailable".into(),
        };
        assert_eq!(err.status_code(), Some(503));

        let err = ProviderError::Request {
            provider: "gemini".into(),
            message: "connection refused".into(),
        };
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_source_error_names_locator() {
        let err = SourceError::Unavailable {
            locator: "/cards".into(),
            message: "not found".into(),
        };
        assert!(err.to_string().contains("/cards"));
    }
}
