//! Interview transcripts as handed to the pipeline.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::InterviewId;

/// Metadata recorded for each parsed transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewMetadata {
    pub interview_id: InterviewId,
    pub file_name: String,
    pub word_count: usize,
    pub estimated_tokens: usize,
}

/// Plain UTF-8 transcript text plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewTranscript {
    pub metadata: InterviewMetadata,
    pub text: String,
}

impl InterviewTranscript {
    /// Creates a transcript, computing word and token counts from the text.
    pub fn new(
        interview_id: InterviewId,
        file_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let metadata = InterviewMetadata {
            interview_id,
            file_name: file_name.into(),
            word_count: text.split_whitespace().count(),
            estimated_tokens: estimate_tokens(&text),
        };
        Self { metadata, text }
    }

    /// Returns the transcript's id.
    pub fn id(&self) -> &InterviewId {
        &self.metadata.interview_id
    }
}

/// Rough token estimate: ~4 characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
