//! `grounded-coder <transcript.txt>...`
//!
//! Analyzes a batch of plain-text interview transcripts and writes the
//! results into the configured output directory.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use grounded_coder::adapters::{
    write_quote_inventory, write_sectioned_report, FsCodebookStore, GeminiConfig, GeminiProvider,
    JsonReportExporter, MarkdownReportExporter, RetryingLlmProvider,
};
use grounded_coder::application::handlers::{
    AnalyzeError, AnalyzeInterviewsCommand, AnalyzeInterviewsHandler,
    GenerateSectionedReportCommand, GenerateSectionedReportHandler,
};
use grounded_coder::config::{AppConfig, LogConfig, ResponseMode, ValidationError};
use grounded_coder::domain::coding::InterviewTranscript;
use grounded_coder::domain::foundation::InterviewId;
use grounded_coder::ports::{AnalysisExporter, ExportError, LlmError, LlmProvider};

#[derive(Debug, Error)]
enum RunError {
    #[error("usage: grounded-coder <transcript.txt>...")]
    Usage,

    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to set up LLM provider: {0}")]
    Provider(#[from] LlmError),

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

impl RunError {
    fn is_transient(&self) -> bool {
        match self {
            RunError::Analyze(err) => err.is_transient(),
            RunError::Provider(err) => err.is_retryable(),
            _ => false,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.log);

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    match run(config, paths).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, transient = e.is_transient(), "Run failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry().with(filter);

    if log.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(config: AppConfig, paths: Vec<PathBuf>) -> Result<(), RunError> {
    if paths.is_empty() {
        return Err(RunError::Usage);
    }
    config.validate()?;

    let transcripts = read_transcripts(&paths).await?;
    let provider = build_provider(&config)?;
    let output_dir = config.output.output_dir.as_path();

    match config.pipeline.response_mode {
        ResponseMode::Json => {
            let store = Arc::new(FsCodebookStore::new(&config.output.codebook_path));
            let handler =
                AnalyzeInterviewsHandler::new(provider, store, config.analysis_settings());
            let outcome = handler.handle(AnalyzeInterviewsCommand { transcripts }).await?;

            let json = JsonReportExporter::new();
            let markdown = MarkdownReportExporter::new();
            let exporters: [&dyn AnalysisExporter; 2] = [&json, &markdown];
            for exporter in exporters {
                let path = exporter
                    .export(&outcome.analysis, &outcome.report, output_dir)
                    .await?;
                tracing::debug!(format = exporter.format_name(), path = %path.display(), "Exported");
            }
            if !outcome.quote_inventory.is_empty() {
                write_quote_inventory(&outcome.quote_inventory, output_dir).await?;
            }

            tracing::info!(
                run_id = %outcome.run_id,
                themes = outcome.analysis.themes.len(),
                codes = outcome.analysis.codes.len(),
                clean = outcome.report.is_clean(),
                "Analysis written"
            );
        }
        ResponseMode::Text => {
            let handler = GenerateSectionedReportHandler::new(provider, config.analysis_settings());
            let report = handler
                .handle(GenerateSectionedReportCommand { transcripts })
                .await?;
            write_sectioned_report(&report, output_dir).await?;
        }
    }

    Ok(())
}

async fn read_transcripts(paths: &[PathBuf]) -> Result<Vec<InterviewTranscript>, RunError> {
    let mut transcripts = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RunError::Read {
                path: path.clone(),
                source,
            })?;
        let id = InterviewId::from_number(index as u32 + 1);
        tracing::debug!(interview_id = %id, path = %path.display(), "Loaded transcript");
        transcripts.push(InterviewTranscript::new(id, file_label(path), text));
    }
    Ok(transcripts)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn build_provider(config: &AppConfig) -> Result<Arc<dyn LlmProvider>, RunError> {
    let api_key = config
        .llm
        .api_key()
        .ok_or(ValidationError::MissingRequired("LLM__API_KEY"))?;

    let gemini = GeminiProvider::new(
        GeminiConfig::new(api_key)
            .with_model(config.llm.model.clone())
            .with_base_url(config.llm.base_url.clone())
            .with_timeout(config.llm.timeout()),
    )?;

    Ok(Arc::new(RetryingLlmProvider::new(
        Arc::new(gemini),
        config.retry_policy(),
    )))
}
