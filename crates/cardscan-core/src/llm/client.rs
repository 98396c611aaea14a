//! The extraction client: one image in, one record or a classified failure out.

use super::provider::{ImageInput, ProviderResponse, VisionProvider, VisionRequest};
use super::quota;
use crate::error::ExtractionFailure;
use crate::types::ExtractionRecord;

/// Sampling settings for extraction calls.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum tokens the model may generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.0,
        }
    }
}

/// Wraps a vision provider with the fixed business-card contract.
///
/// No retries happen here. A single quota failure is reported as
/// [`ExtractionFailure::QuotaExhausted`] and the caller decides what to do.
pub struct ExtractionClient {
    provider: Box<dyn VisionProvider>,
    options: ExtractOptions,
}

impl ExtractionClient {
    pub fn new(provider: Box<dyn VisionProvider>, options: ExtractOptions) -> Self {
        Self { provider, options }
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Extract contact fields from one card image.
    pub async fn extract(
        &self,
        image_bytes: &[u8],
        display_name: &str,
    ) -> Result<ExtractionRecord, ExtractionFailure> {
        let image = ImageInput::for_file(image_bytes, display_name);
        let request =
            VisionRequest::extract_card(image, self.options.max_tokens, self.options.temperature);

        let response = self.call(&request).await?;
        tracing::debug!(
            "{} answered for {} in {}ms ({} tokens)",
            response.model,
            display_name,
            response.latency_ms,
            response
                .tokens_used
                .map_or_else(|| "?".to_string(), |t| t.to_string())
        );

        ExtractionRecord::from_model_json(&response.text, display_name).map_err(|e| {
            tracing::warn!(
                "Malformed JSON for {display_name}: {e}. Raw response: {}",
                response.text
            );
            ExtractionFailure::MalformedResponse {
                message: e.to_string(),
                raw: response.text,
            }
        })
    }

    /// Send a minimal text-only request to see whether quota remains.
    pub async fn check_quota(&self) -> Result<ProviderResponse, ExtractionFailure> {
        self.call(&VisionRequest::ping()).await
    }

    async fn call(&self, request: &VisionRequest) -> Result<ProviderResponse, ExtractionFailure> {
        self.provider.generate(request).await.map_err(|e| {
            tracing::debug!("{} call failed: {e}", self.provider.name());
            quota::classify(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Provider returning a canned result and recording the last request.
    struct CannedProvider {
        result: Box<dyn Fn() -> Result<ProviderResponse, ProviderError> + Send + Sync>,
        last_request: Arc<Mutex<Option<VisionRequest>>>,
    }

    impl CannedProvider {
        fn text(text: &str) -> Self {
            let text = text.to_string();
            Self {
                result: Box::new(move || {
                    Ok(ProviderResponse {
                        text: text.clone(),
                        model: "mock-v1".to_string(),
                        tokens_used: Some(42),
                        latency_ms: 10,
                    })
                }),
                last_request: Arc::new(Mutex::new(None)),
            }
        }

        fn error(make: fn() -> ProviderError) -> Self {
            Self {
                result: Box::new(move || Err(make())),
                last_request: Arc::new(Mutex::new(None)),
            }
        }
    }

    #[async_trait]
    impl VisionProvider for CannedProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn generate(
            &self,
            request: &VisionRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            (self.result)()
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    fn client(provider: CannedProvider) -> ExtractionClient {
        ExtractionClient::new(Box::new(provider), ExtractOptions::default())
    }

    #[tokio::test]
    async fn test_extract_attaches_file_name() {
        let json = r#"{"fullName":"Jane Doe","jobTitle":"CEO","companyName":"Acme Pvt Ltd",
            "primaryEmail":"j@x.com","contactPhone":"555-1, 555-2","websiteURL":"acme.com",
            "physicalAddress":"1 Main St"}"#;
        let record = client(CannedProvider::text(json))
            .extract(&[1, 2, 3], "jane.jpg")
            .await
            .unwrap();
        assert_eq!(record.file_name, "jane.jpg");
        assert_eq!(record.company_name, "Acme Pvt Ltd");
        assert_eq!(record.contact_phone, "555-1, 555-2");
    }

    #[tokio::test]
    async fn test_extract_sends_image_with_mime_from_name() {
        let provider = CannedProvider::text("{}");
        let last = provider.last_request.clone();
        client(provider).extract(&[1, 2, 3], "card.png").await.unwrap();

        let request = last.lock().unwrap().clone().unwrap();
        assert_eq!(request.image.unwrap().media_type, "image/png");
        assert!(request.response_schema.is_some());
    }

    #[tokio::test]
    async fn test_malformed_json_yields_no_record() {
        for raw in ["Sure! Here is the data: {", "[1,2]", "```json\n{}\n```"] {
            let err = client(CannedProvider::text(raw))
                .extract(&[1], "bad.jpg")
                .await
                .unwrap_err();
            match err {
                ExtractionFailure::MalformedResponse { raw: got, .. } => assert_eq!(got, raw),
                other => panic!("expected malformed response, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_quota_error_is_distinguished() {
        let provider = CannedProvider::error(|| ProviderError::Http {
            provider: "mock".into(),
            status: 429,
            body: "RESOURCE_EXHAUSTED".into(),
        });
        let err = client(provider).extract(&[1], "a.jpg").await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_other_errors_are_per_item() {
        let provider = CannedProvider::error(|| ProviderError::Request {
            provider: "mock".into(),
            message: "connection refused".into(),
        });
        let err = client(provider).extract(&[1], "a.jpg").await.unwrap_err();
        assert!(matches!(err, ExtractionFailure::ExtractionFailed(_)));
    }

    #[tokio::test]
    async fn test_check_quota_sends_ping() {
        let provider = CannedProvider::text("OK");
        let last = provider.last_request.clone();
        let response = client(provider).check_quota().await.unwrap();
        assert_eq!(response.text, "OK");
        assert!(last.lock().unwrap().as_ref().unwrap().image.is_none());
    }
}
