//! Google Sheets v4: header row read/insert and row append on one worksheet.

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::{endpoint, read_json, request_error, TokenProvider};
use crate::error::GoogleApiError;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// One tab of a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    pub sheet_id: i64,
    pub title: String,
}

impl Worksheet {
    /// A1-notation range on this worksheet, with the title quoted.
    pub fn range(&self, cells: &str) -> String {
        let quoted = format!("'{}'", self.title.replace('\'', "''"));
        if cells.is_empty() {
            quoted
        } else {
            format!("{quoted}!{cells}")
        }
    }
}

#[derive(Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Minimal Sheets client.
pub struct SheetsClient {
    http: reqwest::Client,
    auth: Arc<dyn TokenProvider>,
    base_url: String,
}

impl SheetsClient {
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

    /// The first worksheet of a spreadsheet.
    pub async fn first_worksheet(&self, spreadsheet_id: &str) -> Result<Worksheet, GoogleApiError> {
        let url = endpoint(&self.base_url, &["spreadsheets", spreadsheet_id])?;
        let token = self.auth.access_token().await?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .send()
            .await
            .map_err(request_error)?;
        let spreadsheet: Spreadsheet = read_json(resp).await?;
        spreadsheet
            .sheets
            .into_iter()
            .next()
            .map(|s| Worksheet {
                sheet_id: s.properties.sheet_id,
                title: s.properties.title,
            })
            .ok_or_else(|| GoogleApiError::InvalidResponse("spreadsheet has no worksheets".into()))
    }

    /// Values of one row (1-based). Empty when the row is blank.
    pub async fn row_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &Worksheet,
        row: u32,
    ) -> Result<Vec<String>, GoogleApiError> {
        let range = worksheet.range(&format!("{row}:{row}"));
        let values = self.get_values(spreadsheet_id, &range).await?;
        Ok(values.into_iter().next().unwrap_or_default())
    }

    /// Number of non-empty rows on the worksheet.
    pub async fn row_count(
        &self,
        spreadsheet_id: &str,
        worksheet: &Worksheet,
    ) -> Result<usize, GoogleApiError> {
        Ok(self
            .get_values(spreadsheet_id, &worksheet.range(""))
            .await?
            .len())
    }

    /// Insert a row at a 1-based index, shifting existing rows down.
    pub async fn insert_row(
        &self,
        spreadsheet_id: &str,
        worksheet: &Worksheet,
        values: &[String],
        index: u32,
    ) -> Result<(), GoogleApiError> {
        let start = index.saturating_sub(1);
        let url = endpoint(
            &self.base_url,
            &["spreadsheets", &format!("{spreadsheet_id}:batchUpdate")],
        )?;
        let body = json!({
            "requests": [{
                "insertDimension": {
                    "range": {
                        "sheetId": worksheet.sheet_id,
                        "dimension": "ROWS",
                        "startIndex": start,
                        "endIndex": start + 1,
                    },
                    "inheritFromBefore": false,
                }
            }]
        });
        let token = self.auth.access_token().await?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;
        let _: serde_json::Value = read_json(resp).await?;

        let range = worksheet.range(&format!("A{index}"));
        let url = endpoint(
            &self.base_url,
            &["spreadsheets", spreadsheet_id, "values", &range],
        )?;
        let token = self.auth.access_token().await?;
        let resp = self
            .http
            .put(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": [values] }))
            .send()
            .await
            .map_err(request_error)?;
        let _: serde_json::Value = read_json(resp).await?;
        Ok(())
    }

    /// Append one row after the last non-empty row.
    pub async fn append_row(
        &self,
        spreadsheet_id: &str,
        worksheet: &Worksheet,
        values: &[String],
    ) -> Result<(), GoogleApiError> {
        let range = worksheet.range("A1");
        let url = endpoint(
            &self.base_url,
            &[
                "spreadsheets",
                spreadsheet_id,
                "values",
                &format!("{range}:append"),
            ],
        )?;
        let token = self.auth.access_token().await?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "majorDimension": "ROWS", "values": [values] }))
            .send()
            .await
            .map_err(request_error)?;
        let _: serde_json::Value = read_json(resp).await?;
        Ok(())
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, GoogleApiError> {
        let url = endpoint(
            &self.base_url,
            &["spreadsheets", spreadsheet_id, "values", range],
        )?;
        let token = self.auth.access_token().await?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(request_error)?;
        let value_range: ValueRange = read_json(resp).await?;
        Ok(value_range.values)
    }
}
