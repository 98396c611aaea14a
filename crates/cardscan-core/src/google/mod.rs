//! Thin REST clients for Google Drive and Google Sheets.
//!
//! Both authenticate through a shared [`TokenProvider`], normally a
//! service-account key exchanged for short-lived bearer tokens.

mod auth;
mod drive;
mod sheets;

pub use auth::{ServiceAccountAuth, ServiceAccountKey, StaticToken, TokenProvider, SCOPES};
pub use drive::{DriveClient, DriveFile};
pub use sheets::{SheetsClient, Worksheet};

use crate::error::GoogleApiError;
use serde::de::DeserializeOwned;

/// Append path segments to a base URL, percent-encoding each one.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<reqwest::Url, GoogleApiError> {
    let mut url =
        reqwest::Url::parse(base).map_err(|e| GoogleApiError::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| GoogleApiError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Fail on non-success status, keeping the body for diagnosis.
pub(crate) async fn check_status(
    resp: reqwest::Response,
) -> Result<reqwest::Response, GoogleApiError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        let body = resp.text().await.unwrap_or_default();
        Err(GoogleApiError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

/// Check status, then decode the JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, GoogleApiError> {
    check_status(resp)
        .await?
        .json()
        .await
        .map_err(|e| GoogleApiError::InvalidResponse(e.to_string()))
}

fn request_error(e: reqwest::Error) -> GoogleApiError {
    GoogleApiError::Request(e.to_string())
}

/// Quote a string literal for a Drive search query.
pub(crate) fn quote_query_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
