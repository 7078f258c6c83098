//! Errors surfaced by the analysis handlers.

use thiserror::Error;

use crate::domain::response::ResponseError;
use crate::ports::{LlmError, StorageError};

/// A failure that aborts an analysis run.
///
/// Per-item conversion problems never show up here; they are reported
/// through `TransformReport`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyzeError {
    #[error("no interview transcripts supplied")]
    NoTranscripts,

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("unusable LLM response: {0}")]
    Response(#[from] ResponseError),

    #[error("codebook storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl AnalyzeError {
    /// True if retrying the whole run could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, AnalyzeError::Llm(err) if err.is_retryable())
    }
}
