//! Pipeline behavior configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Which pipeline the binary runs
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Structured JSON analysis, repaired and transformed
    #[default]
    Json,
    /// Plain-text sectioned report
    Text,
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub response_mode: ResponseMode,

    /// Upper bound on concurrent quote-extraction calls
    #[serde(default = "default_max_concurrent_themes")]
    pub max_concurrent_themes: usize,

    /// Run per-theme quote extraction after the main analysis
    #[serde(default = "default_extract_quotes")]
    pub extract_quotes: bool,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_concurrent_themes == 0 {
            return Err(ValidationError::InvalidConcurrency);
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            response_mode: ResponseMode::default(),
            max_concurrent_themes: default_max_concurrent_themes(),
            extract_quotes: default_extract_quotes(),
        }
    }
}

fn default_max_concurrent_themes() -> usize {
    5
}

fn default_extract_quotes() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.response_mode, ResponseMode::Json);
        assert_eq!(config.max_concurrent_themes, 5);
        assert!(config.extract_quotes);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = PipelineConfig {
            max_concurrent_themes: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidConcurrency));
    }

    #[test]
    fn test_response_mode_deserializes_lowercase() {
        let mode: ResponseMode = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(mode, ResponseMode::Text);
    }
}
