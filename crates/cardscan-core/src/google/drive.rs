//! Google Drive v3: folder listing, file download, spreadsheet lookup.

use futures_util::StreamExt;
use serde::Deserialize;
use std::sync::Arc;

use super::{check_status, endpoint, quote_query_literal, read_json, request_error, TokenProvider};
use crate::error::GoogleApiError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// A file entry returned by a Drive listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// Minimal Drive client.
pub struct DriveClient {
    http: reqwest::Client,
    auth: Arc<dyn TokenProvider>,
    base_url: String,
}

impl DriveClient {
    pub fn new(auth: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Every image file directly inside a folder, following all result pages.
    pub async fn list_images(
        &self,
        folder_id: &str,
        page_size: u32,
    ) -> Result<Vec<DriveFile>, GoogleApiError> {
        let query = format!(
            "{} in parents and mimeType contains 'image/' and trashed = false",
            quote_query_literal(folder_id)
        );

        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.list(&query, page_size, page_token.as_deref()).await?;
            files.extend(page.files);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(files)
    }

    /// List at most one entry of a folder to confirm it is reachable.
    pub async fn probe_folder(&self, folder_id: &str) -> Result<Vec<DriveFile>, GoogleApiError> {
        let query = format!("{} in parents", quote_query_literal(folder_id));
        Ok(self.list(&query, 1, None).await?.files)
    }

    /// Find a spreadsheet the account can see by its exact title.
    pub async fn find_spreadsheet(&self, title: &str) -> Result<Option<String>, GoogleApiError> {
        let query = format!(
            "name = {} and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
            quote_query_literal(title)
        );
        Ok(self
            .list(&query, 1, None)
            .await?
            .files
            .into_iter()
            .next()
            .map(|f| f.id))
    }

    /// Download a file's content, draining the streamed body before returning.
    pub async fn download(&self, file_id: &str) -> Result<Vec<u8>, GoogleApiError> {
        let url = endpoint(&self.base_url, &["files", file_id])?;
        let token = self.auth.access_token().await?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await
            .map_err(request_error)?;
        let resp = check_status(resp).await?;

        let mut bytes = Vec::with_capacity(resp.content_length().unwrap_or(0) as usize);
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(request_error)?;
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    async fn list(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<FileList, GoogleApiError> {
        let url = endpoint(&self.base_url, &["files"])?;
        let token = self.auth.access_token().await?;
        let page_size = page_size.to_string();
        let mut params = vec![
            ("q", query),
            ("pageSize", page_size.as_str()),
            ("fields", "nextPageToken, files(id, name, mimeType)"),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
        ];
        if let Some(page_token) = page_token {
            params.push(("pageToken", page_token));
        }

        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&params)
            .send()
            .await
            .map_err(request_error)?;
        read_json(resp).await
    }
}
