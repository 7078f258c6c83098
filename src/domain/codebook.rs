//! The evolving codebook accumulated across analysis runs.
//!
//! Entries are keyed by human-readable names rather than ids, since ids are
//! reassigned by every run while names stay stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::coding::FullAnalysis;
use crate::domain::foundation::{InterviewId, Timestamp};

/// Most example quotes kept per code.
pub const MAX_EXAMPLE_QUOTES: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodebookTheme {
    pub description: String,
    /// Number of runs in which the theme appeared.
    pub frequency: u32,
}

/// A category groups the codes of one theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodebookCategory {
    pub codes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodebookCode {
    pub definition: String,
    pub frequency: u32,
    /// Name of the category (owning theme) the code was last seen under.
    pub category: String,
    pub example_quotes: Vec<String>,
}

/// Persistent record of every theme and code seen so far.
///
/// Not safe for concurrent writers; see `CodebookStore`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolvingCodebook {
    #[serde(default)]
    pub themes: BTreeMap<String, CodebookTheme>,
    #[serde(default)]
    pub categories: BTreeMap<String, CodebookCategory>,
    #[serde(default)]
    pub codes: BTreeMap<String, CodebookCode>,
    #[serde(default)]
    pub last_updated: Option<Timestamp>,
    #[serde(default)]
    pub interviews_coded: Vec<InterviewId>,
}

impl EvolvingCodebook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty() && self.codes.is_empty()
    }

    /// Folds one analysis into the codebook.
    pub fn record_analysis(&mut self, analysis: &FullAnalysis, interview_ids: &[InterviewId]) {
        for theme in &analysis.themes {
            let entry = self.themes.entry(theme.name.clone()).or_default();
            entry.frequency += 1;
            if entry.description.is_empty() {
                entry.description = theme.description.clone();
            }
        }

        for code in &analysis.codes {
            let owner = analysis.theme(&code.theme_id);
            let category = owner.map(|t| t.name.clone()).unwrap_or_else(|| code.theme_id.clone());

            let members = &mut self.categories.entry(category.clone()).or_default().codes;
            if !members.contains(&code.name) {
                members.push(code.name.clone());
            }

            let entry = self.codes.entry(code.name.clone()).or_default();
            entry.frequency += 1;
            entry.category = category;
            if entry.definition.is_empty() {
                entry.definition = code.definition.clone();
            }

            let quotes = owner.map(|t| t.key_quotes.as_slice()).unwrap_or_default();
            for quote in quotes {
                if entry.example_quotes.len() >= MAX_EXAMPLE_QUOTES {
                    break;
                }
                if !entry.example_quotes.contains(quote) {
                    entry.example_quotes.push(quote.clone());
                }
            }
        }

        for id in interview_ids {
            if !self.interviews_coded.contains(id) {
                self.interviews_coded.push(id.clone());
            }
        }

        self.last_updated = Some(Timestamp::now());
        tracing::debug!(
            themes = self.themes.len(),
            codes = self.codes.len(),
            interviews = self.interviews_coded.len(),
            "Recorded analysis in codebook"
        );
    }
}
