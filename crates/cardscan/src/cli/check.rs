//! The `cardscan check` command: connectivity and quota checks.

use clap::Args;
use console::style;
use std::path::PathBuf;
use std::sync::Arc;

use cardscan_core::config::{resolve_env_var, resolve_path};
use cardscan_core::google::{DriveClient, ServiceAccountAuth, SheetsClient};
use cardscan_core::{Config, ExtractionFailure, RunConfig, RunMode, SheetsSink};

use super::extract::setup::build_client;
use super::types::{key_looks_valid, ProviderArgs};

/// Arguments for the `check` command.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Send one tiny request to see whether the provider still has quota
    #[arg(long)]
    pub quota: bool,

    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Drive folder ID to probe (defaults to `google.drive_folder_id`)
    #[arg(long)]
    pub folder_id: Option<String>,

    /// Spreadsheet title to open (defaults to `google.sheet_title`)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Service-account JSON key (defaults to `google.service_account_file`)
    #[arg(long)]
    pub service_account: Option<PathBuf>,
}

/// Execute the check command.
pub async fn execute(args: CheckArgs, config: Config) -> anyhow::Result<()> {
    let run = run_config(&config, &args);
    if args.quota {
        check_quota(&run).await
    } else {
        check_connections(&run).await
    }
}

fn run_config(config: &Config, args: &CheckArgs) -> RunConfig {
    let mode = RunMode::Drive {
        folder_id: args
            .folder_id
            .clone()
            .or_else(|| resolve_env_var(&config.google.drive_folder_id)),
        sheet_title: args
            .sheet
            .clone()
            .or_else(|| resolve_env_var(&config.google.sheet_title)),
        service_account_file: args
            .service_account
            .as_ref()
            .and_then(|p| resolve_path(&p.to_string_lossy()))
            .or_else(|| resolve_path(&config.google.service_account_file)),
    };
    let mut run = RunConfig::new(config, mode);
    if let Some(provider) = args.provider.provider {
        run.provider = provider.to_string();
    }
    run.model = args.provider.model.clone();
    run.api_key = args.provider.api_key.clone();
    run
}

/// Spend one minimal request to learn whether quota remains.
async fn check_quota(run: &RunConfig) -> anyhow::Result<()> {
    let client = build_client(run)?;
    eprintln!("  Checking {} quota...", client.provider_name());

    match client.check_quota().await {
        Ok(response) => {
            eprintln!(
                "  {} Quota available ({}, {}ms)",
                style("✓").green(),
                response.model,
                response.latency_ms
            );
            Ok(())
        }
        Err(failure @ ExtractionFailure::QuotaExhausted(_)) => {
            eprintln!("  {} {failure}", style("✗").red());
            eprintln!();
            eprintln!("  The free tier resets daily. Options:");
            eprintln!("    - wait for the quota to reset and run again");
            eprintln!("    - enable billing on the API project");
            eprintln!("    - switch provider with --provider or model with --model");
            anyhow::bail!("quota exhausted")
        }
        Err(failure) => {
            eprintln!("  {} {failure}", style("✗").red());
            anyhow::bail!("quota check failed")
        }
    }
}

/// Verify the API key shape, Drive folder access and Sheet access without
/// calling the vision model.
async fn check_connections(run: &RunConfig) -> anyhow::Result<()> {
    let mut failed = 0usize;

    match run.resolved_api_key() {
        Some(key) if key_looks_valid(&run.provider, &key) => {
            report(true, &format!("{} API key present", run.provider));
        }
        Some(_) => {
            failed += 1;
            report(false, &format!("{} API key has an unexpected format", run.provider));
        }
        None if run.requires_api_key() => {
            failed += 1;
            report(false, &format!("{} API key not set", run.provider));
        }
        None => report(true, &format!("{} needs no API key", run.provider)),
    }

    let RunMode::Drive {
        folder_id,
        sheet_title,
        service_account_file,
    } = &run.mode
    else {
        anyhow::bail!("connection check needs Drive settings");
    };

    let Some(key_file) = service_account_file else {
        report(false, "service account file not set; skipping Drive and Sheets");
        anyhow::bail!("{} check(s) failed", failed + 1);
    };

    let auth = match ServiceAccountAuth::from_file(key_file) {
        Ok(auth) => Arc::new(auth),
        Err(e) => {
            report(false, &e.to_string());
            anyhow::bail!("{} check(s) failed", failed + 1);
        }
    };
    report(true, &format!("service account {}", auth.client_email()));
    let drive = DriveClient::new(auth.clone());

    match folder_id {
        Some(folder_id) => match drive.probe_folder(folder_id).await {
            Ok(files) => report(
                true,
                &format!("Drive folder reachable ({} item visible)", files.len()),
            ),
            Err(e) => {
                failed += 1;
                report(false, &format!("Drive folder {folder_id}: {e}"));
            }
        },
        None => {
            failed += 1;
            report(false, "Drive folder ID not set");
        }
    }

    match sheet_title {
        Some(title) => {
            let sheets = SheetsClient::new(auth.clone());
            let opened = SheetsSink::open(sheets, &drive, title, Some(auth.client_email())).await;
            let rows = match opened {
                Ok(sink) => sink.row_count().await,
                Err(e) => Err(e),
            };
            match rows {
                Ok(rows) => report(true, &format!("Sheet '{title}' open ({rows} rows)")),
                Err(e) => {
                    failed += 1;
                    report(false, &e.to_string());
                }
            }
        }
        None => {
            failed += 1;
            report(false, "Google Sheet title not set");
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} check(s) failed");
    }
    eprintln!("  All checks passed.");
    Ok(())
}

fn report(ok: bool, message: &str) {
    let mark = if ok {
        style("✓").green()
    } else {
        style("✗").red()
    };
    eprintln!("  {mark} {message}");
}
