//! Code entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::InterviewId;

/// A code (concept label) applied to interview data.
///
/// Codes form a forest through `parent_code_id`; `child_codes` is derived by
/// scanning the batch, never taken from the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Code {
    pub code_id: String,
    pub name: String,
    pub definition: String,
    pub frequency: u32,
    pub interviews_present: Vec<InterviewId>,
    pub first_appearance: InterviewId,
    pub theme_id: String,
    pub parent_code_id: Option<String>,
    /// 0 for root codes.
    pub hierarchy_level: u32,
    #[serde(default)]
    pub child_codes: Vec<String>,
}

impl Code {
    /// Creates a placeholder code for an item that failed conversion.
    pub fn degraded(code_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code_id: code_id.into(),
            name: name.into(),
            definition: "Code could not be fully processed".to_string(),
            frequency: 1,
            interviews_present: Vec::new(),
            first_appearance: InterviewId::default(),
            theme_id: "T001".to_string(),
            parent_code_id: None,
            hierarchy_level: 0,
            child_codes: Vec::new(),
        }
    }

    /// Returns true if the code has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_code_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_code_is_root_under_first_theme() {
        let code = Code::degraded("C009", "Unnamed");
        assert!(code.is_root());
        assert_eq!(code.theme_id, "T001");
        assert_eq!(code.first_appearance.as_str(), "INT_001");
    }
}
