//! Cardscan Core - business-card contact extraction library.
//!
//! Cardscan reads business-card images from a Google Drive folder or a local
//! directory, asks a vision model for the contact fields on each card, and
//! writes one row per card to a Google Sheet or a CSV export.
//!
//! # Architecture
//!
//! ```text
//! ImageSource → Pipeline → ExtractionClient → Pipeline → OutputSink
//! ```
//!
//! The [`Pipeline`] is strictly sequential and paces calls with a fixed delay.
//! A quota failure from the model halts the run; everything already written
//! stays in the sink.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cardscan_core::{CsvSink, ExtractOptions, ExtractionClient, LocalSource, Pipeline};
//! use cardscan_core::llm::GeminiProvider;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = GeminiProvider::new(
//!         "https://generativelanguage.googleapis.com/v1beta",
//!         &std::env::var("GEMINI_API_KEY")?,
//!         "gemini-2.5-flash-lite",
//!     );
//!     let mut pipeline = Pipeline::new(
//!         Box::new(LocalSource::new("./cards", vec!["jpg".into(), "png".into()])),
//!         ExtractionClient::new(Box::new(provider), ExtractOptions::default()),
//!         Box::new(CsvSink::new()),
//!         Duration::from_secs(2),
//!     );
//!     let report = pipeline.run(|event| println!("{}/{}", event.index, event.total)).await?;
//!     if let Some(csv) = report.export {
//!         std::fs::write("cards.csv", csv)?;
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod google;
pub mod llm;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod types;

// Re-exports for convenient access
pub use config::{Config, RunConfig, RunMode};
pub use error::{ConfigError, ExtractionFailure, RunError, SinkError, SourceError};
pub use llm::{ExtractOptions, ExtractionClient, VisionProviderFactory};
pub use pipeline::{ItemOutcome, Pipeline, ProgressEvent, RunReport, RunState};
pub use sink::{CsvSink, OutputSink, SheetsSink};
pub use source::{DriveSource, ImageSource, LocalSource};
pub use types::{ExtractionRecord, ImageItem, RunStats, HEADER};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
