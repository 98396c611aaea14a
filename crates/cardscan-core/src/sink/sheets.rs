//! Google Sheets sink: one appended row per card.

use async_trait::async_trait;

use super::OutputSink;
use crate::error::SinkError;
use crate::google::{DriveClient, SheetsClient, Worksheet};
use crate::types::{ExtractionRecord, HEADER};

/// Appends rows to the first worksheet of a spreadsheet.
pub struct SheetsSink {
    client: SheetsClient,
    spreadsheet_id: String,
    worksheet: Worksheet,
}

impl SheetsSink {
    /// Open a spreadsheet by title.
    ///
    /// The spreadsheet must already be shared with the service account;
    /// `share_with` names that account in the error when it is not found.
    pub async fn open(
        client: SheetsClient,
        drive: &DriveClient,
        title: &str,
        share_with: Option<&str>,
    ) -> Result<Self, SinkError> {
        let spreadsheet_id = drive
            .find_spreadsheet(title)
            .await
            .map_err(|e| SinkError::Unavailable(format!("searching for '{title}': {e}")))?
            .ok_or_else(|| {
                let who = share_with.unwrap_or("the service account");
                SinkError::Unavailable(format!(
                    "spreadsheet '{title}' not found; share it with {who}"
                ))
            })?;

        Self::with_id(client, spreadsheet_id).await
    }

    /// Use a spreadsheet whose id is already known.
    pub async fn with_id(
        client: SheetsClient,
        spreadsheet_id: impl Into<String>,
    ) -> Result<Self, SinkError> {
        let spreadsheet_id = spreadsheet_id.into();
        let worksheet = client
            .first_worksheet(&spreadsheet_id)
            .await
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;
        tracing::debug!(
            "Writing to worksheet '{}' of spreadsheet {spreadsheet_id}",
            worksheet.title
        );

        Ok(Self {
            client,
            spreadsheet_id,
            worksheet,
        })
    }

    /// Number of non-empty rows, header included.
    pub async fn row_count(&self) -> Result<usize, SinkError> {
        self.client
            .row_count(&self.spreadsheet_id, &self.worksheet)
            .await
            .map_err(|e| SinkError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl OutputSink for SheetsSink {
    fn name(&self) -> &str {
        "sheets"
    }

    async fn ensure_header(&mut self) -> Result<(), SinkError> {
        let first_row = self
            .client
            .row_values(&self.spreadsheet_id, &self.worksheet, 1)
            .await
            .map_err(|e| SinkError::Unavailable(format!("reading header row: {e}")))?;

        if first_row.iter().map(String::as_str).eq(HEADER) {
            return Ok(());
        }

        tracing::info!("Header row missing or different; inserting it at row 1");
        let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
        self.client
            .insert_row(&self.spreadsheet_id, &self.worksheet, &header, 1)
            .await
            .map_err(|e| SinkError::Unavailable(format!("inserting header row: {e}")))
    }

    async fn write(&mut self, record: &ExtractionRecord) -> Result<(), SinkError> {
        self.client
            .append_row(&self.spreadsheet_id, &self.worksheet, &record.to_row())
            .await
            .map_err(|e| SinkError::Append {
                file_name: record.file_name.clone(),
                message: e.to_string(),
            })
    }

    async fn finalize(&mut self) -> Result<Option<Vec<u8>>, SinkError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::StaticToken;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_worksheet(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/spreadsheets/sid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sheets": [{"properties": {"sheetId": 0, "title": "Sheet1"}}]
            })))
            .mount(server)
            .await;
    }

    async fn mount_first_row(server: &MockServer, row: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/spreadsheets/sid/values/.*1:1$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "values": [row] })))
            .mount(server)
            .await;
    }

    async fn sink(server: &MockServer) -> SheetsSink {
        let client =
            SheetsClient::new(Arc::new(StaticToken("t".into()))).with_base_url(&server.uri());
        SheetsSink::with_id(client, "sid").await.unwrap()
    }

    #[tokio::test]
    async fn test_wrong_header_is_inserted_before_rows() {
        let server = MockServer::start().await;
        mount_worksheet(&server).await;
        mount_first_row(&server, json!(["Name", "Email"])).await;
        Mock::given(method("POST"))
            .and(path("/spreadsheets/sid:batchUpdate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/spreadsheets/sid/values/"))
            .and(body_partial_json(json!({ "values": [HEADER] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        sink(&server).await.ensure_header().await.unwrap();
    }

    #[tokio::test]
    async fn test_correct_header_is_left_alone() {
        let server = MockServer::start().await;
        mount_worksheet(&server).await;
        mount_first_row(&server, json!(HEADER)).await;
        Mock::given(method("POST"))
            .and(path("/spreadsheets/sid:batchUpdate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        sink(&server).await.ensure_header().await.unwrap();
    }

    #[tokio::test]
    async fn test_header_prefix_is_not_enough() {
        let server = MockServer::start().await;
        mount_worksheet(&server).await;
        mount_first_row(&server, json!(&HEADER[..7])).await;
        Mock::given(method("POST"))
            .and(path("/spreadsheets/sid:batchUpdate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        sink(&server).await.ensure_header().await.unwrap();
    }

    #[tokio::test]
    async fn test_write_appends_fixed_order_row() {
        let server = MockServer::start().await;
        mount_worksheet(&server).await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/spreadsheets/sid/values/.*:append$"))
            .and(body_partial_json(json!({
                "values": [["a.jpg", "Jane Doe", "", "Acme", "", "", "", ""]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let record = ExtractionRecord {
            file_name: "a.jpg".into(),
            full_name: "Jane Doe".into(),
            company_name: "Acme".into(),
            ..Default::default()
        };
        let mut sink = sink(&server).await;
        sink.write(&record).await.unwrap();
        assert_eq!(sink.finalize().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_append_failure_names_the_file() {
        let server = MockServer::start().await;
        mount_worksheet(&server).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
            .mount(&server)
            .await;

        let record = ExtractionRecord {
            file_name: "z.jpg".into(),
            ..Default::default()
        };
        let err = sink(&server).await.write(&record).await.unwrap_err();
        assert!(matches!(err, SinkError::Append { ref file_name, .. } if file_name == "z.jpg"));
    }

    #[tokio::test]
    async fn test_open_missing_spreadsheet_hints_at_sharing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
            .mount(&server)
            .await;

        let token = Arc::new(StaticToken("t".into()));
        let drive = DriveClient::new(token.clone()).with_base_url(&server.uri());
        let sheets = SheetsClient::new(token).with_base_url(&server.uri());

        let err = SheetsSink::open(sheets, &drive, "Cards", Some("bot@proj.iam.gserviceaccount.com"))
            .await
            .err()
            .unwrap();
        let message = err.to_string();
        assert!(message.contains("Cards"));
        assert!(message.contains("bot@proj.iam.gserviceaccount.com"));
    }
}
