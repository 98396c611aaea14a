//! Translation of raw provider failures into classified extraction failures.
//!
//! This is the only place provider error text is inspected. Everything
//! downstream branches on [`ExtractionFailure`] variants.

use crate::error::{ExtractionFailure, ProviderError};

/// Markers providers put in quota-exhaustion error bodies.
const QUOTA_MARKERS: [&str; 2] = ["RESOURCE_EXHAUSTED", "ResourceExhausted"];

/// Determine whether a provider error means the quota is used up.
///
/// Matches HTTP 429, or a resource-exhausted marker anywhere in the error
/// text (some gateways report it with a different status).
pub fn is_quota_exhausted(error: &ProviderError) -> bool {
    if error.status_code() == Some(429) {
        return true;
    }
    match error {
        ProviderError::Http { body: text, .. } | ProviderError::Request { message: text, .. } => {
            QUOTA_MARKERS.iter().any(|marker| text.contains(marker))
        }
        ProviderError::InvalidResponse { .. } | ProviderError::NotConfigured(_) => false,
    }
}

/// Classify a provider error as fatal quota exhaustion or a per-item failure.
pub fn classify(error: ProviderError) -> ExtractionFailure {
    if is_quota_exhausted(&error) {
        ExtractionFailure::QuotaExhausted(error.to_string())
    } else {
        ExtractionFailure::ExtractionFailed(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, body: &str) -> ProviderError {
        ProviderError::Http {
            provider: "gemini".to_string(),
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_429_is_quota() {
        assert!(is_quota_exhausted(&http(429, "Too Many Requests")));
    }

    #[test]
    fn test_resource_exhausted_marker_is_quota() {
        let err = http(403, r#"{"error": {"status": "RESOURCE_EXHAUSTED"}}"#);
        assert!(is_quota_exhausted(&err));

        let err = ProviderError::Request {
            provider: "gemini".to_string(),
            message: "ResourceExhausted: daily limit".to_string(),
        };
        assert!(is_quota_exhausted(&err));
    }

    #[test]
    fn test_server_error_is_not_quota() {
        assert!(!is_quota_exhausted(&http(503, "service unavailable")));
    }

    #[test]
    fn test_message_with_429_in_text_is_not_quota_without_status() {
        // A body mentioning "429" is not a status code
        let err = ProviderError::Request {
            provider: "gemini".to_string(),
            message: "connection reset after 429 bytes".to_string(),
        };
        assert!(!is_quota_exhausted(&err));
    }

    #[test]
    fn test_invalid_response_is_not_quota() {
        let err = ProviderError::InvalidResponse {
            provider: "gemini".to_string(),
            message: "RESOURCE_EXHAUSTED".to_string(),
        };
        assert!(!is_quota_exhausted(&err));
    }

    #[test]
    fn test_classify_maps_variants() {
        assert!(matches!(
            classify(http(429, "")),
            ExtractionFailure::QuotaExhausted(_)
        ));
        match classify(http(401, "unauthorized")) {
            ExtractionFailure::ExtractionFailed(msg) => assert!(msg.contains("unauthorized")),
            other => panic!("expected per-item failure, got {other:?}"),
        }
    }
}
