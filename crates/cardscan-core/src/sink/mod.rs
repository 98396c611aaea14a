//! Output sinks for extracted rows.

mod csv;
mod sheets;

pub use self::csv::CsvSink;
pub use self::sheets::SheetsSink;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::types::ExtractionRecord;

/// Destination for extracted records.
///
/// The pipeline calls [`ensure_header`](OutputSink::ensure_header) once before
/// processing, [`write`](OutputSink::write) once per successful card and
/// [`finalize`](OutputSink::finalize) once at the end of the run, halted or not.
#[async_trait]
pub trait OutputSink: Send {
    /// Short name for logs ("sheets", "csv").
    fn name(&self) -> &str;

    /// Make sure the fixed header row is in place before any data row.
    async fn ensure_header(&mut self) -> Result<(), SinkError>;

    /// Record one row. Remote sinks append immediately.
    async fn write(&mut self, record: &ExtractionRecord) -> Result<(), SinkError>;

    /// Flush buffered rows. Returns an export payload when the sink produces one.
    async fn finalize(&mut self) -> Result<Option<Vec<u8>>, SinkError>;
}
