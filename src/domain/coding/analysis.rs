//! The complete, internally consistent analysis result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Code, ContradictionPair, QuoteChain, SaturationAssessment, StakeholderPosition, Theme};
use crate::domain::foundation::{InterviewId, Timestamp};

/// Facts about the analysis run that the LLM does not supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub total_interviews: u32,
    pub interview_ids: Vec<InterviewId>,
    pub total_words: usize,
    pub model: String,
    pub analyzed_at: Timestamp,
}

impl AnalysisMetadata {
    /// Creates metadata for the given interviews.
    pub fn new(interview_ids: Vec<InterviewId>, total_words: usize, model: impl Into<String>) -> Self {
        Self {
            total_interviews: interview_ids.len() as u32,
            interview_ids,
            total_words,
            model: model.into(),
            analyzed_at: Timestamp::now(),
        }
    }
}

impl Default for AnalysisMetadata {
    fn default() -> Self {
        Self::new(Vec::new(), 0, "unknown")
    }
}

/// Full analysis result consumed by exporters and the codebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullAnalysis {
    pub themes: Vec<Theme>,
    pub codes: Vec<Code>,
    pub quote_chains: Vec<QuoteChain>,
    pub contradictions: Vec<ContradictionPair>,
    pub stakeholder_positions: Vec<StakeholderPosition>,
    pub theoretical_insights: Vec<String>,
    pub emergent_theory: String,
    pub methodological_notes: String,
    pub saturation: SaturationAssessment,
    pub overall_confidence: f64,
    /// Theme id to the ids of codes owned by that theme.
    pub theme_code_map: BTreeMap<String, Vec<String>>,
    pub metadata: AnalysisMetadata,
}

impl FullAnalysis {
    /// Looks up a theme by id.
    pub fn theme(&self, theme_id: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.theme_id == theme_id)
    }

    /// Looks up a code by id.
    pub fn code(&self, code_id: &str) -> Option<&Code> {
        self.codes.iter().find(|c| c.code_id == code_id)
    }
}
