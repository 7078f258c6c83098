//! Concurrent per-theme quote extraction.
//!
//! Each theme gets its own LLM call; calls run concurrently and are joined.
//! Branches share nothing, so a failing branch only loses its own quotes.

use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;

use crate::application::prompts::quote_extraction_prompt;
use crate::domain::coding::{InterviewTranscript, QuoteEvidence, Theme};
use crate::domain::response::parse_quote;
use crate::ports::{GenerationConfig, LlmProvider};

/// Extracts supporting quotes for a bounded number of themes.
pub struct QuoteExtractor {
    provider: Arc<dyn LlmProvider>,
    config: GenerationConfig,
    max_concurrent_themes: usize,
}

impl QuoteExtractor {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        config: GenerationConfig,
        max_concurrent_themes: usize,
    ) -> Self {
        Self {
            provider,
            config,
            max_concurrent_themes,
        }
    }

    /// Runs one extraction per theme (the first `max_concurrent_themes`)
    /// and concatenates the results in theme order.
    pub async fn extract(
        &self,
        themes: &[Theme],
        transcripts: &[InterviewTranscript],
    ) -> Vec<QuoteEvidence> {
        let selected = &themes[..themes.len().min(self.max_concurrent_themes)];
        if selected.len() < themes.len() {
            tracing::info!(
                selected = selected.len(),
                total = themes.len(),
                "Limiting quote extraction to leading themes"
            );
        }

        let branches = selected
            .iter()
            .map(|theme| self.extract_for_theme(theme, transcripts));

        join_all(branches).await.into_iter().flatten().collect()
    }

    async fn extract_for_theme(
        &self,
        theme: &Theme,
        transcripts: &[InterviewTranscript],
    ) -> Vec<QuoteEvidence> {
        let prompt = quote_extraction_prompt(theme, transcripts);

        let value = match self.provider.generate(&prompt, &self.config).await {
            Ok(raw) => raw.into_json_value(),
            Err(err) => {
                tracing::warn!(theme_id = %theme.theme_id, error = %err, "Quote extraction call failed");
                return Vec::new();
            }
        };

        match value {
            Ok(value) => {
                let quotes = quotes_from_value(&value, theme);
                tracing::debug!(theme_id = %theme.theme_id, count = quotes.len(), "Extracted quotes");
                quotes
            }
            Err(err) => {
                tracing::warn!(theme_id = %theme.theme_id, error = %err, "Quote extraction response unusable");
                Vec::new()
            }
        }
    }
}

/// Accepts a bare array or an object holding a `quotes` array.
fn quotes_from_value(value: &Value, theme: &Theme) -> Vec<QuoteEvidence> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => obj
            .get("quotes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.as_str()),
            Value::Object(obj) => obj.get("text").and_then(Value::as_str),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .enumerate()
        .map(|(n, text)| {
            parse_quote(
                text,
                format!("{}_EQ{:02}", theme.theme_id, n + 1),
                theme.name.as_str(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::llm::{MockLlmProvider, MockResponse};
    use crate::domain::foundation::InterviewId;
    use crate::domain::response::RawLlmResponse;
    use crate::ports::LlmError;

    fn transcripts() -> Vec<InterviewTranscript> {
        vec![InterviewTranscript::new(InterviewId::from_number(1), "a.txt", "We trust the tool.")]
    }

    fn themes(n: usize) -> Vec<Theme> {
        (1..=n)
            .map(|i| Theme::degraded(format!("T{i:03}"), format!("Theme{i}")))
            .collect()
    }

    fn json(body: &str) -> MockResponse {
        MockResponse::Success(RawLlmResponse::Json(body.to_string()))
    }

    #[tokio::test]
    async fn concatenates_quotes_in_theme_order() {
        let mock = MockLlmProvider::new()
            .with_response_for("\"Theme2\"", json(r#"["Ann (Interview 2): second"]"#))
            .with_response_for("\"Theme1\"", json(r#"["Bob (Interview 1): first"]"#));
        let extractor = QuoteExtractor::new(Arc::new(mock), GenerationConfig::default(), 5);

        let quotes = extractor.extract(&themes(2), &transcripts()).await;

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].quote_id, "T001_EQ01");
        assert_eq!(quotes[0].speaker_role, "Bob");
        assert_eq!(quotes[1].interview_id.as_str(), "INT_002");
        assert_eq!(quotes[1].context, "Theme2");
    }

    #[tokio::test]
    async fn limits_number_of_themes() {
        let mock = Arc::new(MockLlmProvider::new());
        let extractor = QuoteExtractor::new(mock.clone(), GenerationConfig::default(), 3);

        extractor.extract(&themes(7), &transcripts()).await;

        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn failing_branch_contributes_nothing() {
        let mock = MockLlmProvider::new()
            .with_response_for("\"Theme1\"", MockResponse::Error(LlmError::unavailable("down")))
            .with_response_for("\"Theme2\"", json(r#"{"quotes": ["Interview 4: kept"]}"#));
        let extractor = QuoteExtractor::new(Arc::new(mock), GenerationConfig::default(), 5);

        let quotes = extractor.extract(&themes(2), &transcripts()).await;

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].text, "kept");
    }

    #[tokio::test]
    async fn repairs_malformed_arrays() {
        let mock = MockLlmProvider::new().with_response_for("\"Theme1\"", json(r#"["a quote",]"#));
        let extractor = QuoteExtractor::new(Arc::new(mock), GenerationConfig::default(), 5);

        let quotes = extractor.extract(&themes(1), &transcripts()).await;

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].interview_id, InterviewId::default());
    }

    #[test]
    fn ignores_non_text_items() {
        let theme = Theme::degraded("T001", "Trust");
        let value = serde_json::json!(["ok", 3, null, {"text": "from object"}, ""]);
        let quotes = quotes_from_value(&value, &theme);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].text, "from object");
    }
}
