//! Run bootstrap: merge flags over config, then pick the source and sink.
//!
//! This is the only place that looks at the run mode.

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cardscan_core::config::{resolve_env_var, resolve_path};
use cardscan_core::google::{DriveClient, ServiceAccountAuth, SheetsClient};
use cardscan_core::{
    Config, CsvSink, DriveSource, ExtractOptions, ExtractionClient, ImageSource, LocalSource,
    OutputSink, Pipeline, RunConfig, RunMode, SheetsSink, VisionProviderFactory,
};

use super::{ExtractArgs, SourceCommand};

/// A ready-to-run pipeline and where its export goes, if anywhere.
pub(crate) struct RunPlan {
    pub pipeline: Pipeline,
    pub export_to: Option<PathBuf>,
}

/// Build the run configuration: CLI flags first, then the config file.
pub fn build_run_config(config: &Config, args: &ExtractArgs) -> RunConfig {
    let mode = match &args.source {
        SourceCommand::Drive(drive) => RunMode::Drive {
            folder_id: drive
                .folder_id
                .clone()
                .or_else(|| resolve_env_var(&config.google.drive_folder_id)),
            sheet_title: drive
                .sheet
                .clone()
                .or_else(|| resolve_env_var(&config.google.sheet_title)),
            service_account_file: drive
                .service_account
                .as_ref()
                .and_then(|p| resolve_path(&p.to_string_lossy()))
                .or_else(|| resolve_path(&config.google.service_account_file)),
        },
        SourceCommand::Local(local) => RunMode::Local {
            dir: local
                .dir
                .as_ref()
                .and_then(|p| resolve_path(&p.to_string_lossy())),
            output: local
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.output.csv_file)),
        },
    };

    let mut run = RunConfig::new(config, mode);
    if let Some(provider) = args.provider.provider {
        run.provider = provider.to_string();
    }
    run.model = args.provider.model.clone();
    run.api_key = args.provider.api_key.clone();
    if let Some(delay_ms) = args.delay_ms {
        run.extraction.request_delay_ms = delay_ms;
    }
    run
}

/// Create the extraction client for a validated run.
pub fn build_client(run: &RunConfig) -> anyhow::Result<ExtractionClient> {
    let provider = VisionProviderFactory::create(
        &run.provider,
        &run.llm_config(),
        run.model.as_deref(),
        Duration::from_millis(run.extraction.timeout_ms),
    )?;
    tracing::debug!("Using {} vision provider", provider.name());

    Ok(ExtractionClient::new(
        provider,
        ExtractOptions {
            max_tokens: run.extraction.max_tokens,
            temperature: run.extraction.temperature,
        },
    ))
}

/// Open the source and sink for a validated run and wire up the pipeline.
pub(crate) async fn build_pipeline(run: &RunConfig) -> anyhow::Result<RunPlan> {
    let client = build_client(run)?;

    let (source, sink, export_to): (Box<dyn ImageSource>, Box<dyn OutputSink>, _) =
        match &run.mode {
            RunMode::Drive {
                folder_id,
                sheet_title,
                service_account_file,
            } => {
                let (Some(folder_id), Some(sheet_title), Some(key_file)) =
                    (folder_id, sheet_title, service_account_file)
                else {
                    anyhow::bail!("Drive run is missing its folder, sheet or key file");
                };

                let auth = Arc::new(ServiceAccountAuth::from_file(key_file).with_context(|| {
                    format!("Loading service account key {}", key_file.display())
                })?);
                let account = auth.client_email().to_string();
                tracing::info!("Authenticating as {account}");

                let drive = DriveClient::new(auth.clone());
                let sheets = SheetsClient::new(auth.clone());
                let sink = SheetsSink::open(sheets, &drive, sheet_title, Some(&account)).await?;
                let source = DriveSource::new(drive, folder_id.clone(), run.source.drive_page_size);

                (
                    Box::new(source) as Box<dyn ImageSource>,
                    Box::new(sink) as Box<dyn OutputSink>,
                    None,
                )
            }
            RunMode::Local { dir, output } => {
                let Some(dir) = dir else {
                    anyhow::bail!("Local run is missing its folder");
                };
                let source = LocalSource::new(dir.clone(), run.source.supported_formats.clone());

                (
                    Box::new(source) as Box<dyn ImageSource>,
                    Box::new(CsvSink::new()) as Box<dyn OutputSink>,
                    Some(output.clone()),
                )
            }
        };

    Ok(RunPlan {
        pipeline: Pipeline::new(source, client, sink, run.request_delay()),
        export_to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::extract::{DriveArgs, LocalArgs};
    use crate::cli::types::{ProviderArgs, ProviderKind};

    fn local_args(dir: Option<&str>, output: Option<&str>) -> ExtractArgs {
        ExtractArgs {
            source: SourceCommand::Local(LocalArgs {
                dir: dir.map(PathBuf::from),
                output: output.map(PathBuf::from),
            }),
            provider: ProviderArgs::default(),
            delay_ms: None,
        }
    }

    #[test]
    fn test_local_defaults_output_from_config() {
        let config = Config::default();
        let run = build_run_config(&config, &local_args(Some("/tmp/cards"), None));

        match run.mode {
            RunMode::Local { dir, output } => {
                assert_eq!(dir, Some(PathBuf::from("/tmp/cards")));
                assert_eq!(output, PathBuf::from("extracted_business_cards.csv"));
            }
            other => panic!("expected local mode, got {other:?}"),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config::default();
        let mut args = local_args(Some("/tmp/cards"), Some("-"));
        args.provider = ProviderArgs {
            provider: Some(ProviderKind::Ollama),
            model: Some("llava".into()),
            api_key: None,
        };
        args.delay_ms = Some(0);

        let run = build_run_config(&config, &args);
        assert_eq!(run.provider, "ollama");
        assert_eq!(run.model.as_deref(), Some("llava"));
        assert_eq!(run.request_delay(), Duration::ZERO);
        assert!(run.validate().is_ok());
    }

    #[test]
    fn test_missing_local_dir_fails_validation() {
        let config = Config::default();
        let mut args = local_args(None, None);
        args.provider.provider = Some(ProviderKind::Ollama);

        let run = build_run_config(&config, &args);
        assert!(run.validate().is_err());
    }

    #[test]
    fn test_drive_flags_fill_mode() {
        let mut config = Config::default();
        config.google.sheet_title = "Cards".into();
        let args = ExtractArgs {
            source: SourceCommand::Drive(DriveArgs {
                folder_id: Some("folder-1".into()),
                sheet: None,
                service_account: Some(PathBuf::from("/keys/sa.json")),
            }),
            provider: ProviderArgs::default(),
            delay_ms: None,
        };

        match build_run_config(&config, &args).mode {
            RunMode::Drive {
                folder_id,
                sheet_title,
                service_account_file,
            } => {
                assert_eq!(folder_id.as_deref(), Some("folder-1"));
                assert_eq!(sheet_title.as_deref(), Some("Cards"));
                assert_eq!(service_account_file, Some(PathBuf::from("/keys/sa.json")));
            }
            other => panic!("expected drive mode, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_local_plan_exports_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let mut args = local_args(dir.path().to_str(), Some("out.csv"));
        args.provider.provider = Some(ProviderKind::Ollama);

        let run = build_run_config(&config, &args);
        let plan = build_pipeline(&run).await.unwrap();
        assert_eq!(plan.export_to, Some(PathBuf::from("out.csv")));
    }
}
