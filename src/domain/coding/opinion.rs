//! Contradictions and stakeholder positions.

use serde::{Deserialize, Serialize};

/// Two opposing positions on one topic, with who holds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContradictionPair {
    pub contradiction_id: String,
    pub topic: String,
    pub position_a: String,
    pub position_b: String,
    pub position_a_holders: Vec<String>,
    pub position_b_holders: Vec<String>,
    pub position_a_quotes: Vec<String>,
    pub position_b_quotes: Vec<String>,
    pub resolution_suggestions: Vec<String>,
}

/// The stance of one stakeholder group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeholderPosition {
    pub stakeholder_type: String,
    pub position: String,
    pub supporting_quotes: Vec<String>,
    pub concerns: Vec<String>,
    pub recommendations: Vec<String>,
}
