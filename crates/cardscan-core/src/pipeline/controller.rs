//! Sequential extraction controller.

use std::time::Duration;

use super::progress::{
    truncate_error, ItemFailure, ItemOutcome, ProgressEvent, RunReport, RunState,
    ERROR_PREVIEW_CHARS,
};
use crate::error::{ExtractionFailure, RunError};
use crate::llm::ExtractionClient;
use crate::sink::OutputSink;
use crate::source::ImageSource;
use crate::types::{ImageItem, RunStats};

/// Drives one run: list the source, then fetch, extract and write each item
/// strictly one after another.
pub struct Pipeline {
    source: Box<dyn ImageSource>,
    client: ExtractionClient,
    sink: Box<dyn OutputSink>,
    request_delay: Duration,
    state: RunState,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn ImageSource>,
        client: ExtractionClient,
        sink: Box<dyn OutputSink>,
        request_delay: Duration,
    ) -> Self {
        Self {
            source,
            client,
            sink,
            request_delay,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run the pipeline to completion or quota halt.
    ///
    /// `on_progress` is called once per attempted item. The item that
    /// triggers a quota halt is not reported and not counted.
    pub async fn run<F>(&mut self, mut on_progress: F) -> Result<RunReport, RunError>
    where
        F: FnMut(&ProgressEvent),
    {
        if let Err(e) = self.sink.ensure_header().await {
            tracing::error!("Cannot prepare {} sink: {e}", self.sink.name());
            self.state = RunState::Failed;
            return Err(e.into());
        }

        self.state = RunState::Listing;
        let items = match self.source.list_items().await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("Cannot list {} source: {e}", self.source.name());
                self.state = RunState::Failed;
                return Err(e.into());
            }
        };

        let total = items.len();
        tracing::info!(
            "Processing {total} images from {} with {}",
            self.source.name(),
            self.client.provider_name()
        );

        self.state = RunState::Processing;
        let mut stats = RunStats {
            total,
            ..RunStats::default()
        };
        let mut failures = Vec::new();
        let mut halt_reason = None;

        for (i, item) in items.into_iter().enumerate() {
            let outcome = match self.process_item(&item).await {
                Ok(outcome) => outcome,
                Err(failure) => {
                    tracing::error!(
                        "Quota exhausted at {} ({}/{total}); stopping to preserve data. {} processed so far",
                        item.name,
                        i + 1,
                        stats.processed
                    );
                    halt_reason = Some(failure.to_string());
                    break;
                }
            };

            match outcome.error_message() {
                None => {
                    stats.processed += 1;
                    tracing::info!("Processed {} ({}/{total})", item.name, i + 1);
                }
                Some(message) => {
                    stats.errors += 1;
                    tracing::warn!(
                        "Failed {}: {}",
                        item.name,
                        truncate_error(&message, ERROR_PREVIEW_CHARS)
                    );
                    tracing::debug!("Full error for {}: {message}", item.name);
                    failures.push(ItemFailure {
                        file_name: item.name.clone(),
                        message,
                    });
                }
            }

            on_progress(&ProgressEvent {
                index: i + 1,
                total,
                stats,
                item,
                outcome,
            });

            if i + 1 < total && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        self.state = if halt_reason.is_some() {
            RunState::Halted
        } else {
            RunState::Completed
        };

        let export = match self.sink.finalize().await {
            Ok(export) => export,
            Err(e) => {
                tracing::error!("Failed to finalize {} sink: {e}", self.sink.name());
                None
            }
        };

        tracing::info!(
            "Run {:?}: {}/{} processed, {} errors",
            self.state,
            stats.processed,
            stats.total,
            stats.errors
        );

        Ok(RunReport {
            state: self.state,
            stats,
            export,
            failures,
            halt_reason,
        })
    }

    /// Fetch, extract and write one item.
    ///
    /// `Err` only for quota exhaustion; every other failure is an outcome.
    async fn process_item(&mut self, item: &ImageItem) -> Result<ItemOutcome, ExtractionFailure> {
        let bytes = match self.source.fetch(item).await {
            Ok(bytes) => bytes,
            Err(e) => return Ok(ItemOutcome::FetchFailed(e.to_string())),
        };

        let record = match self.client.extract(&bytes, &item.name).await {
            Ok(record) => record,
            Err(failure) if failure.is_fatal() => return Err(failure),
            Err(failure) => return Ok(ItemOutcome::ExtractionFailed(failure)),
        };

        Ok(match self.sink.write(&record).await {
            Ok(()) => ItemOutcome::Processed,
            Err(e) => ItemOutcome::WriteFailed(e.to_string()),
        })
    }
}
