//! Progress events and the final run report.

use crate::error::ExtractionFailure;
use crate::types::{ImageItem, RunStats};

/// How many characters of an error message go into per-item logs.
pub const ERROR_PREVIEW_CHARS: usize = 80;

/// Lifecycle of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Listing,
    Processing,
    /// Every listed item was attempted
    Completed,
    /// Stopped early on quota exhaustion; rows already written stay valid
    Halted,
    /// The source could not be listed or the sink could not be prepared
    Failed,
}

/// What happened to one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Extracted and written to the sink
    Processed,
    /// The image bytes could not be fetched
    FetchFailed(String),
    /// The extraction call failed or returned unusable output
    ExtractionFailed(ExtractionFailure),
    /// Extracted, but the sink rejected the row
    WriteFailed(String),
}

impl ItemOutcome {
    /// Full error text, if the item failed.
    pub fn error_message(&self) -> Option<String> {
        match self {
            ItemOutcome::Processed => None,
            ItemOutcome::FetchFailed(msg) | ItemOutcome::WriteFailed(msg) => Some(msg.clone()),
            ItemOutcome::ExtractionFailed(failure) => Some(failure.to_string()),
        }
    }
}

/// Emitted by the controller after every attempted item.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// 1-based position of this item in the listing
    pub index: usize,
    /// Number of listed items
    pub total: usize,
    /// Counters after this item
    pub stats: RunStats,
    pub item: ImageItem,
    pub outcome: ItemOutcome,
}

impl ProgressEvent {
    /// Share of the listing seen so far, in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.index as f64 / self.total as f64
        }
    }
}

/// A per-item failure kept for the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub file_name: String,
    pub message: String,
}

/// Outcome of a run that got past listing.
#[derive(Debug)]
pub struct RunReport {
    /// `Completed` or `Halted`
    pub state: RunState,
    pub stats: RunStats,
    /// Export payload from the sink, when it produces one
    pub export: Option<Vec<u8>>,
    /// Per-item failures in processing order
    pub failures: Vec<ItemFailure>,
    /// The quota message that stopped the run
    pub halt_reason: Option<String>,
}

impl RunReport {
    pub fn halted(&self) -> bool {
        self.state == RunState::Halted
    }
}

/// Cut an error message to at most `max` characters on a char boundary.
pub fn truncate_error(message: &str, max: usize) -> String {
    match message.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_message_untouched() {
        assert_eq!(truncate_error("timeout", 80), "timeout");
    }

    #[test]
    fn test_truncate_long_message() {
        let long = "x".repeat(100);
        let cut = truncate_error(&long, 80);
        assert_eq!(cut.len(), 83);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let message = "é".repeat(90);
        let cut = truncate_error(&message, 80);
        assert_eq!(cut.chars().count(), 83);
    }

    #[test]
    fn test_fraction() {
        let event = ProgressEvent {
            index: 1,
            total: 4,
            stats: RunStats::default(),
            item: ImageItem::new("1", "a.jpg"),
            outcome: ItemOutcome::Processed,
        };
        assert!((event.fraction() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_outcome_messages() {
        assert!(ItemOutcome::Processed.error_message().is_none());
        let outcome = ItemOutcome::ExtractionFailed(ExtractionFailure::MalformedResponse {
            message: "expected value".into(),
            raw: "oops".into(),
        });
        assert!(outcome.error_message().unwrap().contains("expected value"));
    }
}
