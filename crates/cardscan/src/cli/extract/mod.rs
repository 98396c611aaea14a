//! The `cardscan extract` command.

mod progress;
pub(crate) mod setup;

use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use cardscan_core::{Config, RunState};

use super::types::ProviderArgs;
use progress::ProgressView;

/// Arguments for the `extract` command.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[command(subcommand)]
    pub source: SourceCommand,

    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Pause between cards in milliseconds (defaults to `extraction.request_delay_ms`)
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,
}

/// Where the card images come from.
#[derive(Subcommand, Debug)]
pub enum SourceCommand {
    /// Cards in a Google Drive folder; rows go to a Google Sheet
    Drive(DriveArgs),

    /// Cards in a local folder; rows go to a CSV file
    Local(LocalArgs),
}

#[derive(Args, Debug, Default)]
pub struct DriveArgs {
    /// Drive folder ID (defaults to `google.drive_folder_id`)
    #[arg(long)]
    pub folder_id: Option<String>,

    /// Spreadsheet title (defaults to `google.sheet_title`)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Service-account JSON key (defaults to `google.service_account_file`)
    #[arg(long)]
    pub service_account: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct LocalArgs {
    /// Folder containing the card images
    pub dir: Option<PathBuf>,

    /// CSV destination, `-` for stdout (defaults to `output.csv_file`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the extract command.
pub async fn execute(args: ExtractArgs, config: Config) -> anyhow::Result<()> {
    let run = setup::build_run_config(&config, &args);
    run.validate()?;

    let plan = setup::build_pipeline(&run).await?;
    let mut pipeline = plan.pipeline;

    let mut view = ProgressView::new();
    let result = pipeline.run(|event| view.on_item(event)).await;
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            view.abandon();
            anyhow::bail!("Run aborted before processing: {e}");
        }
    };

    view.finish(&report);

    match (report.export, plan.export_to) {
        (Some(payload), Some(target)) => write_export(&target, &payload)?,
        (None, Some(_)) => tracing::info!("No rows extracted; no CSV written"),
        _ => {}
    }

    if report.state == RunState::Halted {
        anyhow::bail!("Stopped early: API quota exhausted");
    }
    Ok(())
}

/// Write the CSV payload to a file, or stdout for `-`.
fn write_export(target: &Path, payload: &[u8]) -> anyhow::Result<()> {
    if target == Path::new("-") {
        use std::io::Write;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(payload)?;
        stdout.flush()?;
        return Ok(());
    }

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, payload)?;
    tracing::info!("CSV written to {:?}", target);
    eprintln!("  Saved {}", target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_export_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out").join("cards.csv");

        write_export(&target, b"\"fileName\"\n").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"\"fileName\"\n");
    }

    #[test]
    fn test_write_export_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("cards.csv");
        std::fs::write(&target, "old").unwrap();

        write_export(&target, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
    }
}
