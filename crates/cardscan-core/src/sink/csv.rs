//! In-memory CSV export.

use async_trait::async_trait;
use csv::{QuoteStyle, WriterBuilder};

use super::OutputSink;
use crate::error::SinkError;
use crate::types::{ExtractionRecord, HEADER};

/// Buffers rows for the whole run and renders them as one CSV payload.
#[derive(Debug, Default)]
pub struct CsvSink {
    rows: Vec<[String; 8]>,
}

impl CsvSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows buffered so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render header plus buffered rows with every field quoted.
    fn render(rows: &[[String; 8]]) -> Result<Vec<u8>, SinkError> {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(Vec::new());

        writer
            .write_record(HEADER)
            .map_err(|e| SinkError::Export(e.to_string()))?;
        for row in rows {
            writer
                .write_record(row)
                .map_err(|e| SinkError::Export(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| SinkError::Export(e.to_string()))
    }
}

#[async_trait]
impl OutputSink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    async fn ensure_header(&mut self) -> Result<(), SinkError> {
        // The header is written at render time.
        Ok(())
    }

    async fn write(&mut self, record: &ExtractionRecord) -> Result<(), SinkError> {
        self.rows.push(record.to_row());
        Ok(())
    }

    async fn finalize(&mut self) -> Result<Option<Vec<u8>>, SinkError> {
        if self.rows.is_empty() {
            return Ok(None);
        }
        let rows = std::mem::take(&mut self.rows);
        tracing::debug!("Rendering {} rows as CSV", rows.len());
        Self::render(&rows).map(Some)
    }
}
