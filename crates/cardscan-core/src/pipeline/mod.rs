//! The pipeline controller and the events it reports.
//!
//! - **controller**: the sequential list → fetch → extract → write loop
//! - **progress**: run states, per-item outcomes, progress events, run report

mod controller;
mod progress;

pub use controller::Pipeline;
pub use progress::{
    truncate_error, ItemFailure, ItemOutcome, ProgressEvent, RunReport, RunState,
    ERROR_PREVIEW_CHARS,
};
