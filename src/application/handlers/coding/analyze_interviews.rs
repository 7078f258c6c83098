//! AnalyzeInterviewsHandler - Runs the structured (JSON) analysis pipeline.
//!
//! prompt → LLM (JSON mode) → repair/parse → fix → transform →
//! per-theme quote extraction → codebook update.

use std::sync::Arc;

use crate::application::prompts::{analysis_prompt, analysis_response_schema};
use crate::domain::coding::{AnalysisMetadata, FullAnalysis, InterviewTranscript, QuoteEvidence};
use crate::domain::foundation::{InterviewId, RunId};
use crate::domain::response::{fix_response_data, transform_to_full_schema, TransformReport};
use crate::ports::{CodebookStore, GenerationConfig, LlmProvider};

use super::errors::AnalyzeError;
use super::extract_quotes::QuoteExtractor;

/// Tunables for an analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Upper bound on concurrent quote-extraction calls.
    pub max_concurrent_themes: usize,
    pub extract_quotes: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 65_536,
            max_concurrent_themes: 5,
            extract_quotes: true,
        }
    }
}

/// Command to analyze a batch of interviews.
#[derive(Debug, Clone)]
pub struct AnalyzeInterviewsCommand {
    pub transcripts: Vec<InterviewTranscript>,
}

/// Result of a successful analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub run_id: RunId,
    pub analysis: FullAnalysis,
    /// Items degraded or dropped while building `analysis`.
    pub report: TransformReport,
    /// Quotes gathered by the per-theme extraction pass.
    pub quote_inventory: Vec<QuoteEvidence>,
}

/// Handler for structured interview analysis.
pub struct AnalyzeInterviewsHandler {
    provider: Arc<dyn LlmProvider>,
    codebook_store: Arc<dyn CodebookStore>,
    settings: AnalysisSettings,
}

impl AnalyzeInterviewsHandler {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        codebook_store: Arc<dyn CodebookStore>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            provider,
            codebook_store,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: AnalyzeInterviewsCommand,
    ) -> Result<AnalysisOutcome, AnalyzeError> {
        if cmd.transcripts.is_empty() {
            return Err(AnalyzeError::NoTranscripts);
        }

        let run_id = RunId::new();
        let interview_ids: Vec<InterviewId> =
            cmd.transcripts.iter().map(|t| t.id().clone()).collect();
        let total_words: usize = cmd.transcripts.iter().map(|t| t.metadata.word_count).sum();
        let model = self.provider.provider_info().model;
        tracing::info!(
            run_id = %run_id,
            interviews = interview_ids.len(),
            words = total_words,
            model = %model,
            "Starting interview analysis"
        );

        // 1. Ask for the simplified schema
        let config = GenerationConfig::json(self.settings.temperature, self.settings.max_output_tokens)
            .with_schema(analysis_response_schema());
        let raw = self
            .provider
            .generate(&analysis_prompt(&cmd.transcripts), &config)
            .await?;

        // 2. Parse, fill and shape
        let simple = fix_response_data(raw.into_json_object()?);
        let metadata = AnalysisMetadata::new(interview_ids.clone(), total_words, model);
        let (analysis, report) = transform_to_full_schema(&simple, metadata);

        // 3. Supporting quotes per theme
        let quote_inventory = if self.settings.extract_quotes && !analysis.themes.is_empty() {
            let extractor = QuoteExtractor::new(
                self.provider.clone(),
                GenerationConfig::json(self.settings.temperature, self.settings.max_output_tokens),
                self.settings.max_concurrent_themes,
            );
            extractor.extract(&analysis.themes, &cmd.transcripts).await
        } else {
            Vec::new()
        };

        // 4. Fold into the evolving codebook (single writer)
        let mut codebook = self.codebook_store.load().await?;
        codebook.record_analysis(&analysis, &interview_ids);
        self.codebook_store.save(&codebook).await?;

        tracing::info!(
            run_id = %run_id,
            themes = analysis.themes.len(),
            codes = analysis.codes.len(),
            quote_chains = analysis.quote_chains.len(),
            quotes = quote_inventory.len(),
            degraded = report.degraded_count(),
            dropped = report.dropped_count(),
            "Interview analysis complete"
        );

        Ok(AnalysisOutcome {
            run_id,
            analysis,
            report,
            quote_inventory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::llm::MockLlmProvider;
    use crate::domain::codebook::EvolvingCodebook;
    use crate::domain::response::ResponseError;
    use crate::ports::{LlmError, ResponseMimeType, StorageError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ─────────────────────────────────────────────────────────────────────
    // Mock implementations
    // ─────────────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct InMemoryCodebookStore {
        saved: Mutex<Option<EvolvingCodebook>>,
        fail_save: bool,
    }

    #[async_trait]
    impl CodebookStore for InMemoryCodebookStore {
        async fn load(&self) -> Result<EvolvingCodebook, StorageError> {
            Ok(self.saved.lock().unwrap().clone().unwrap_or_default())
        }

        async fn save(&self, codebook: &EvolvingCodebook) -> Result<(), StorageError> {
            if self.fail_save {
                return Err(StorageError::IoError("disk full".to_string()));
            }
            *self.saved.lock().unwrap() = Some(codebook.clone());
            Ok(())
        }
    }

    const RESPONSE: &str = r#"```json
{
  "themes": [
    {"name": "Trust", "description": "Trust in tools", "prevalence": "most interviews", "key_quotes": ["I rely on it"]},
    {"name": "", "theme_id": "T002"}
  ],
  "codes": [
    {"name": "Reliability", "theme_id": "T001"},
    {"name": "Uptime", "theme_id": "T001", "parent_code_id": "C001"}
  ],
  "quote_chains": [
    {"theme_id": "T001", "chain_type": "Problem-Solution", "quotes": ["Ann (Interview 2): it broke, then we fixed it"]},
    {"chain_type": "evolution"}
  ],
  "saturation_point": "INT_002",
}
```"#;

    fn transcripts() -> Vec<InterviewTranscript> {
        vec![
            InterviewTranscript::new(InterviewId::from_number(1), "one.txt", "I rely on it every day"),
            InterviewTranscript::new(InterviewId::from_number(2), "two.txt", "It broke, then we fixed it"),
        ]
    }

    fn handler(
        mock: MockLlmProvider,
        store: Arc<InMemoryCodebookStore>,
        settings: AnalysisSettings,
    ) -> AnalyzeInterviewsHandler {
        AnalyzeInterviewsHandler::new(Arc::new(mock), store, settings)
    }

    fn no_quotes() -> AnalysisSettings {
        AnalysisSettings {
            extract_quotes: false,
            ..AnalysisSettings::default()
        }
    }

    #[tokio::test]
    async fn runs_full_pipeline() {
        let store = Arc::new(InMemoryCodebookStore::default());
        let h = handler(MockLlmProvider::new().with_json(RESPONSE), store.clone(), no_quotes());

        let outcome = h
            .handle(AnalyzeInterviewsCommand { transcripts: transcripts() })
            .await
            .unwrap();

        let analysis = &outcome.analysis;
        assert_eq!(analysis.themes.len(), 2);
        assert_eq!(analysis.themes[0].theme_id, "T001");
        assert_eq!(analysis.themes[0].prevalence, 0.8);
        assert_eq!(analysis.themes[0].associated_codes, vec!["C001", "C002"]);
        assert_eq!(analysis.code("C001").unwrap().child_codes, vec!["C002"]);
        assert_eq!(analysis.quote_chains.len(), 1);
        assert_eq!(analysis.saturation.interview_number, Some(2));
        assert_eq!(analysis.metadata.total_interviews, 2);
        assert_eq!(analysis.metadata.model, "mock-model-1");
        assert_eq!(outcome.report.degraded_count(), 1);
        assert_eq!(outcome.report.dropped_count(), 1);
    }

    #[tokio::test]
    async fn requests_json_with_schema() {
        let mock = MockLlmProvider::new().with_json(RESPONSE);
        let provider = Arc::new(mock.clone());
        let h = AnalyzeInterviewsHandler::new(
            provider,
            Arc::new(InMemoryCodebookStore::default()),
            no_quotes(),
        );

        h.handle(AnalyzeInterviewsCommand { transcripts: transcripts() })
            .await
            .unwrap();

        let calls = mock.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].config.response_mime_type, ResponseMimeType::ApplicationJson);
        assert!(calls[0].config.response_schema.is_some());
        assert!(calls[0].prompt.contains("INT_002"));
    }

    #[tokio::test]
    async fn updates_codebook() {
        let store = Arc::new(InMemoryCodebookStore::default());
        let h = handler(MockLlmProvider::new().with_json(RESPONSE), store.clone(), no_quotes());

        h.handle(AnalyzeInterviewsCommand { transcripts: transcripts() })
            .await
            .unwrap();

        let saved = store.saved.lock().unwrap().clone().unwrap();
        assert_eq!(saved.themes["Trust"].frequency, 1);
        assert_eq!(saved.codes["Uptime"].category, "Trust");
        assert_eq!(saved.codes["Reliability"].example_quotes, vec!["I rely on it"]);
        assert_eq!(saved.interviews_coded.len(), 2);
    }

    #[tokio::test]
    async fn extracts_quotes_for_themes() {
        let mock = MockLlmProvider::new()
            .with_json(RESPONSE)
            .with_json(r#"["Bob (Interview 1): I rely on it every day"]"#)
            .with_json("[]");
        let h = handler(mock, Arc::new(InMemoryCodebookStore::default()), AnalysisSettings::default());

        let outcome = h
            .handle(AnalyzeInterviewsCommand { transcripts: transcripts() })
            .await
            .unwrap();

        assert_eq!(outcome.quote_inventory.len(), 1);
        assert_eq!(outcome.quote_inventory[0].interview_id.as_str(), "INT_001");
    }

    #[tokio::test]
    async fn rejects_empty_batch() {
        let h = handler(MockLlmProvider::new(), Arc::new(InMemoryCodebookStore::default()), no_quotes());
        let err = h
            .handle(AnalyzeInterviewsCommand { transcripts: Vec::new() })
            .await
            .unwrap_err();
        assert_eq!(err, AnalyzeError::NoTranscripts);
    }

    #[tokio::test]
    async fn surfaces_llm_errors() {
        let mock = MockLlmProvider::new().with_error(LlmError::TokenLimitExceeded("too long".into()));
        let h = handler(mock, Arc::new(InMemoryCodebookStore::default()), no_quotes());

        let err = h
            .handle(AnalyzeInterviewsCommand { transcripts: transcripts() })
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzeError::Llm(LlmError::TokenLimitExceeded(_))));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn surfaces_unparseable_response() {
        let mock = MockLlmProvider::new().with_json("Sorry, I cannot help with that.");
        let h = handler(mock, Arc::new(InMemoryCodebookStore::default()), no_quotes());

        let err = h
            .handle(AnalyzeInterviewsCommand { transcripts: transcripts() })
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzeError::Response(ResponseError::Parse { .. })));
    }

    #[tokio::test]
    async fn surfaces_codebook_failures() {
        let store = Arc::new(InMemoryCodebookStore {
            fail_save: true,
            ..Default::default()
        });
        let h = handler(MockLlmProvider::new().with_json(RESPONSE), store, no_quotes());

        let err = h
            .handle(AnalyzeInterviewsCommand { transcripts: transcripts() })
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzeError::Storage(_)));
    }
}
