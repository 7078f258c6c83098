//! Theme entity.

use serde::{Deserialize, Serialize};

/// A theme identified across interviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub theme_id: String,
    pub name: String,
    pub description: String,
    /// Share of interviews in which the theme appears, always within [0, 1].
    pub prevalence: f64,
    pub interviews_count: u32,
    pub key_quotes: Vec<String>,
    /// Always within [0, 1].
    pub confidence_score: f64,
    /// Derived from the codes whose `theme_id` points here.
    #[serde(default)]
    pub associated_codes: Vec<String>,
}

impl Theme {
    /// Creates a placeholder theme for an item that failed conversion.
    ///
    /// Keeps whatever id and name could be salvaged and defaults the rest.
    pub fn degraded(theme_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            theme_id: theme_id.into(),
            name: name.into(),
            description: "Theme could not be fully processed".to_string(),
            prevalence: 0.5,
            interviews_count: 1,
            key_quotes: Vec::new(),
            confidence_score: 0.0,
            associated_codes: Vec::new(),
        }
    }
}
