//! GenerateSectionedReportHandler - Runs the plain-text (sectioned) pipeline.

use std::sync::Arc;

use crate::application::prompts::sectioned_report_prompt;
use crate::domain::coding::InterviewTranscript;
use crate::domain::response::{ResponseError, SectionName, SectionedReport};
use crate::ports::{GenerationConfig, LlmProvider};

use super::analyze_interviews::AnalysisSettings;
use super::errors::AnalyzeError;

/// Command to produce a sectioned report for a batch of interviews.
#[derive(Debug, Clone)]
pub struct GenerateSectionedReportCommand {
    pub transcripts: Vec<InterviewTranscript>,
}

/// Handler for text-mode analysis.
pub struct GenerateSectionedReportHandler {
    provider: Arc<dyn LlmProvider>,
    settings: AnalysisSettings,
}

impl GenerateSectionedReportHandler {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: AnalysisSettings) -> Self {
        Self { provider, settings }
    }

    pub async fn handle(
        &self,
        cmd: GenerateSectionedReportCommand,
    ) -> Result<SectionedReport, AnalyzeError> {
        if cmd.transcripts.is_empty() {
            return Err(AnalyzeError::NoTranscripts);
        }

        let config = GenerationConfig::text(self.settings.temperature, self.settings.max_output_tokens);
        let raw = self
            .provider
            .generate(&sectioned_report_prompt(&cmd.transcripts), &config)
            .await?;

        if raw.is_empty() {
            return Err(ResponseError::Empty.into());
        }

        let report = SectionedReport::from_sections(raw.into_sections());

        let found = SectionName::ALL
            .iter()
            .filter(|s| report.sections.has_content(**s))
            .count();
        if found == 0 {
            tracing::warn!("No report sections detected in response");
        } else {
            tracing::info!(
                sections = found,
                metrics_found = report.metrics.traceability_completeness.is_some(),
                "Sectioned report parsed"
            );
        }

        Ok(report)
    }
}
