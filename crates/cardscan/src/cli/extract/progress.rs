//! Progress bar, recent-activity log and the end-of-run summary.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::VecDeque;
use std::time::Instant;

use cardscan_core::pipeline::{truncate_error, ERROR_PREVIEW_CHARS};
use cardscan_core::{ProgressEvent, RunReport, RunState};

/// How many log lines the summary repeats.
const RECENT_LINES: usize = 10;

/// Terminal view of a running extraction.
pub struct ProgressView {
    bar: ProgressBar,
    recent: VecDeque<String>,
    started: Instant,
}

impl ProgressView {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_message("listing images...");
        Self {
            bar,
            recent: VecDeque::with_capacity(RECENT_LINES),
            started: Instant::now(),
        }
    }

    /// Update the bar from one controller event.
    pub fn on_item(&mut self, event: &ProgressEvent) {
        if self.bar.length() != Some(event.total as u64) {
            self.bar.set_length(event.total as u64);
            self.bar.set_style(bar_style());
        }
        self.bar.set_position(event.index as u64);
        self.bar.set_message(format!(
            "{} ok, {} errors",
            event.stats.processed, event.stats.errors
        ));
        self.push_line(item_line(event));
    }

    /// Clear the bar after a run that never started processing.
    pub fn abandon(&self) {
        self.bar.finish_and_clear();
    }

    /// Clear the bar and print the summary.
    pub fn finish(&self, report: &RunReport) {
        self.bar.finish_and_clear();
        print_summary(report, &self.recent, self.started.elapsed());
    }

    fn push_line(&mut self, line: String) {
        if self.recent.len() == RECENT_LINES {
            self.recent.pop_front();
        }
        self.recent.push_back(line);
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

/// One recent-activity line for an item.
fn item_line(event: &ProgressEvent) -> String {
    match event.outcome.error_message() {
        None => format!("✓ {}", event.item.name),
        Some(message) => format!(
            "✗ {}: {}",
            event.item.name,
            truncate_error(&message, ERROR_PREVIEW_CHARS)
        ),
    }
}

/// Print a formatted summary after the run.
fn print_summary(report: &RunReport, recent: &VecDeque<String>, elapsed: std::time::Duration) {
    let stats = report.stats;

    if !recent.is_empty() {
        eprintln!();
        eprintln!("  Recent activity:");
        for line in recent {
            eprintln!("    {line}");
        }
    }

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Processed:    {:>8}", format!("{}/{}", stats.processed, stats.total));
    if stats.errors > 0 {
        eprintln!("    Errors:       {:>8}", stats.errors);
    }
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("  ====================================");

    match report.state {
        RunState::Halted => {
            eprintln!(
                "  {}",
                style("API quota exhausted: stopped early to preserve data.")
                    .yellow()
                    .bold()
            );
            eprintln!(
                "  {} rows were saved. Wait for the quota to reset, then run again.",
                stats.processed
            );
            if let Some(reason) = &report.halt_reason {
                eprintln!("  Reason: {}", truncate_error(reason, ERROR_PREVIEW_CHARS));
            }
        }
        _ if stats.total == 0 => {
            eprintln!("  {}", style("No images found.").yellow());
        }
        _ => {
            eprintln!(
                "  {} {}/{} cards extracted.",
                style("Done.").green().bold(),
                stats.processed,
                stats.total
            );
        }
    }
}
