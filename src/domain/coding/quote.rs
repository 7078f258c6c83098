//! Quote evidence and quote chains.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::InterviewId;

/// A single attributed quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEvidence {
    pub quote_id: String,
    pub text: String,
    pub interview_id: InterviewId,
    pub line_numbers: Option<Vec<u32>>,
    pub speaker_role: String,
    pub context: String,
}

/// How the quotes in a chain relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainType {
    #[default]
    Evolution,
    Contradiction,
    ConsensusBuilding,
    ProblemSolution,
}

impl ChainType {
    /// All canonical chain types.
    pub const ALL: [ChainType; 4] = [
        ChainType::Evolution,
        ChainType::Contradiction,
        ChainType::ConsensusBuilding,
        ChainType::ProblemSolution,
    ];

    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainType::Evolution => "evolution",
            ChainType::Contradiction => "contradiction",
            ChainType::ConsensusBuilding => "consensus_building",
            ChainType::ProblemSolution => "problem_solution",
        }
    }

    /// Maps free text onto a canonical chain type.
    ///
    /// Exact matches win after lower-casing and folding hyphens and spaces
    /// to underscores. Otherwise substring heuristics apply in order
    /// (problem+solution, consensus, contradict, evol) and anything left
    /// over becomes `Evolution`.
    pub fn normalize(raw: &str) -> Self {
        let folded = raw.trim().to_lowercase().replace(['-', ' '], "_");

        if let Some(exact) = Self::ALL.iter().find(|t| t.as_str() == folded) {
            return *exact;
        }

        let normalized = if folded.contains("problem") && folded.contains("solution") {
            ChainType::ProblemSolution
        } else if folded.contains("consensus") {
            ChainType::ConsensusBuilding
        } else if folded.contains("contradict") {
            ChainType::Contradiction
        } else if folded.contains("evol") {
            ChainType::Evolution
        } else {
            tracing::warn!(chain_type = raw, "Unknown chain type, defaulting to evolution");
            return ChainType::Evolution;
        };

        tracing::debug!(chain_type = raw, normalized = normalized.as_str(), "Normalized chain type");
        normalized
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ordered sequence of quotes illustrating how an idea develops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteChain {
    pub chain_id: String,
    pub theme_id: String,
    pub chain_type: ChainType,
    pub description: String,
    pub quotes: Vec<QuoteEvidence>,
}
