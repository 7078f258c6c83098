//! Splits plain-text LLM reports into named sections.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of sections a plain-text report may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionName {
    ThemesCsv,
    CodesCsv,
    QuotesCsv,
    QuoteChainsCsv,
    ContradictionsCsv,
    StakeholderPositionsCsv,
    SaturationCurveCsv,
    TraceabilityMatrixCsv,
    MarkdownReport,
    ExecutiveSummary,
    CompleteQuoteInventoryJson,
    InterviewSummariesJson,
    Metrics,
}

impl SectionName {
    /// Every canonical section, in report order.
    pub const ALL: [SectionName; 13] = [
        SectionName::ThemesCsv,
        SectionName::CodesCsv,
        SectionName::QuotesCsv,
        SectionName::QuoteChainsCsv,
        SectionName::ContradictionsCsv,
        SectionName::StakeholderPositionsCsv,
        SectionName::SaturationCurveCsv,
        SectionName::TraceabilityMatrixCsv,
        SectionName::MarkdownReport,
        SectionName::ExecutiveSummary,
        SectionName::CompleteQuoteInventoryJson,
        SectionName::InterviewSummariesJson,
        SectionName::Metrics,
    ];

    /// Canonical header name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionName::ThemesCsv => "THEMES_CSV",
            SectionName::CodesCsv => "CODES_CSV",
            SectionName::QuotesCsv => "QUOTES_CSV",
            SectionName::QuoteChainsCsv => "QUOTE_CHAINS_CSV",
            SectionName::ContradictionsCsv => "CONTRADICTIONS_CSV",
            SectionName::StakeholderPositionsCsv => "STAKEHOLDER_POSITIONS_CSV",
            SectionName::SaturationCurveCsv => "SATURATION_CURVE_CSV",
            SectionName::TraceabilityMatrixCsv => "TRACEABILITY_MATRIX_CSV",
            SectionName::MarkdownReport => "MARKDOWN_REPORT",
            SectionName::ExecutiveSummary => "EXECUTIVE_SUMMARY",
            SectionName::CompleteQuoteInventoryJson => "COMPLETE_QUOTE_INVENTORY_JSON",
            SectionName::InterviewSummariesJson => "INTERVIEW_SUMMARIES_JSON",
            SectionName::Metrics => "METRICS",
        }
    }

    /// Resolves an exact canonical name, no aliases.
    pub fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == name)
    }

    /// Resolves a normalized header (uppercase, underscores) to a section.
    ///
    /// Accepts canonical names plus the variants LLMs commonly emit.
    pub fn from_normalized(name: &str) -> Option<Self> {
        if let Some(exact) = Self::from_canonical(name) {
            return Some(exact);
        }
        let section = match name {
            "THEMES" | "THEME_CSV" | "THEMES.CSV" => SectionName::ThemesCsv,
            "CODES" | "CODE_CSV" | "CODES.CSV" | "CODEBOOK_CSV" => SectionName::CodesCsv,
            "QUOTES" | "QUOTE_CSV" | "QUOTES.CSV" => SectionName::QuotesCsv,
            "QUOTE_CHAINS" | "QUOTE_CHAIN_CSV" | "CHAINS_CSV" => SectionName::QuoteChainsCsv,
            "CONTRADICTIONS" | "CONTRADICTION_CSV" => SectionName::ContradictionsCsv,
            "STAKEHOLDER_POSITIONS" | "STAKEHOLDERS_CSV" | "STAKEHOLDER_CSV" => {
                SectionName::StakeholderPositionsCsv
            }
            "SATURATION_CURVE" | "SATURATION_CSV" => SectionName::SaturationCurveCsv,
            "TRACEABILITY_MATRIX" | "TRACEABILITY_CSV" => SectionName::TraceabilityMatrixCsv,
            "MARKDOWN" | "REPORT" | "FULL_REPORT" | "MARKDOWN_REPORT_MD" => {
                SectionName::MarkdownReport
            }
            "SUMMARY" | "EXEC_SUMMARY" => SectionName::ExecutiveSummary,
            "QUOTE_INVENTORY" | "COMPLETE_QUOTE_INVENTORY" | "QUOTE_INVENTORY_JSON" => {
                SectionName::CompleteQuoteInventoryJson
            }
            "INTERVIEW_SUMMARIES" | "INTERVIEW_SUMMARY_JSON" => SectionName::InterviewSummariesJson,
            "QUALITY_METRICS" | "METRIC" => SectionName::Metrics,
            _ => return None,
        };
        Some(section)
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Section contents keyed by canonical name.
///
/// Every canonical section is always present; undetected ones hold an empty
/// string, so callers never branch on a missing key. Headers that use a
/// strong delimiter (`=== X ===`) but name no canonical section are kept in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSections {
    sections: BTreeMap<SectionName, String>,
    extra: BTreeMap<String, String>,
}

impl Default for ParsedSections {
    fn default() -> Self {
        Self {
            sections: SectionName::ALL
                .iter()
                .map(|s| (*s, String::new()))
                .collect(),
            extra: BTreeMap::new(),
        }
    }
}

impl ParsedSections {
    /// Returns the content of a section (possibly empty).
    pub fn get(&self, name: SectionName) -> &str {
        self.sections.get(&name).map(String::as_str).unwrap_or("")
    }

    /// Returns true if the section carried content.
    pub fn has_content(&self, name: SectionName) -> bool {
        !self.get(name).is_empty()
    }

    /// Iterates all canonical sections in report order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionName, &str)> {
        self.sections.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Sections with non-canonical names.
    pub fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    /// Number of canonical sections (always 13).
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Never true: all canonical keys are always present.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    fn insert(&mut self, key: &SectionKey, content: String) {
        match key {
            SectionKey::Canonical(name) => {
                self.sections.insert(*name, content);
            }
            SectionKey::Other(name) => {
                self.extra.insert(name.clone(), content);
            }
        }
    }
}

#[derive(Debug, Clone)]
enum SectionKey {
    Canonical(SectionName),
    Other(String),
}

struct HeaderPattern {
    regex: Regex,
    /// Loose patterns only count as headers for exact canonical names, so
    /// ordinary `Summary:` or `[ Themes ]` lines stay part of the content.
    canonical_only: bool,
}

static HEADER_PATTERNS: Lazy<Vec<HeaderPattern>> = Lazy::new(|| {
    let pattern = |re: &str, canonical_only| HeaderPattern {
        regex: Regex::new(re).expect("header regex is valid"),
        canonical_only,
    };
    vec![
        pattern(r"^\s*===\s*(.+?)\s*===\s*$", false),
        pattern(r"^\s*==\s*(.+?)\s*==\s*$", false),
        pattern(r"^\s*###\s*(.+?)\s*###\s*$", false),
        pattern(r"(?i)^([a-z][a-z0-9_ .]*?)\s*:\s*$", true),
        pattern(r"^\s*\[\s*(.+?)\s*\]\s*$", true),
    ]
});

/// Normalizes a captured header: uppercase, spaces and hyphens to underscores.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace('-', "_")
}

fn match_header(line: &str) -> Option<SectionKey> {
    for pattern in HEADER_PATTERNS.iter() {
        let Some(caps) = pattern.regex.captures(line) else {
            continue;
        };
        let normalized = normalize_header(caps.get(1).map(|m| m.as_str()).unwrap_or(""));
        if normalized.is_empty() {
            continue;
        }
        let resolved = if pattern.canonical_only {
            SectionName::from_canonical(&normalized)
        } else {
            SectionName::from_normalized(&normalized)
        };
        match resolved {
            Some(name) => return Some(SectionKey::Canonical(name)),
            None if !pattern.canonical_only => return Some(SectionKey::Other(normalized)),
            None => continue,
        }
    }
    None
}

/// Parses a plain-text report into sections.
///
/// Text before the first recognized header is discarded. A section that
/// appears twice keeps its last occurrence.
pub fn parse_sections(text: &str) -> ParsedSections {
    let mut parsed = ParsedSections::default();
    let mut current: Option<SectionKey> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(key) = match_header(line) {
            if let Some(previous) = current.take() {
                parsed.insert(&previous, buffer.join("\n").trim().to_string());
            }
            buffer.clear();
            current = Some(key);
            continue;
        }

        if current.is_some() {
            buffer.push(line);
        }
    }

    if let Some(last) = current {
        parsed.insert(&last, buffer.join("\n").trim().to_string());
    }

    let found = SectionName::ALL
        .iter()
        .filter(|s| parsed.has_content(**s))
        .count();
    tracing::debug!(found, extra = parsed.extra.len(), "Parsed report sections");

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_all_sections_empty() {
        let parsed = parse_sections("");
        assert_eq!(parsed.len(), 13);
        for (_, content) in parsed.iter() {
            assert_eq!(content, "");
        }
    }

    #[test]
    fn recognizes_every_header_style() {
        let text = "\
=== THEMES_CSV ===
theme_id,name
== CODES CSV ==
code_id,name
### QUOTES_CSV ###
quote_id,text
Metrics:
coverage: 0.8
[ EXECUTIVE SUMMARY ]
All good.";
        let parsed = parse_sections(text);
        assert_eq!(parsed.get(SectionName::ThemesCsv), "theme_id,name");
        assert_eq!(parsed.get(SectionName::CodesCsv), "code_id,name");
        assert_eq!(parsed.get(SectionName::QuotesCsv), "quote_id,text");
        assert_eq!(parsed.get(SectionName::Metrics), "coverage: 0.8");
        assert_eq!(parsed.get(SectionName::ExecutiveSummary), "All good.");
    }

    #[test]
    fn aliases_collapse_to_canonical_names() {
        let parsed = parse_sections("=== Themes ===\nx\n=== quote inventory ===\n[]");
        assert_eq!(parsed.get(SectionName::ThemesCsv), "x");
        assert_eq!(parsed.get(SectionName::CompleteQuoteInventoryJson), "[]");
    }

    #[test]
    fn text_before_first_header_is_discarded() {
        let parsed = parse_sections("Here is your analysis\n=== METRICS ===\na: 1");
        assert_eq!(parsed.get(SectionName::Metrics), "a: 1");
        assert!(parsed.iter().all(|(_, c)| !c.contains("Here is")));
    }

    #[test]
    fn colon_lines_inside_sections_stay_content() {
        let parsed = parse_sections("=== MARKDOWN_REPORT ===\nFindings:\n- one");
        assert_eq!(parsed.get(SectionName::MarkdownReport), "Findings:\n- one");
    }

    #[test]
    fn alias_words_in_loose_form_stay_content() {
        let text = "\
=== EXECUTIVE_SUMMARY ===
Adoption hinges on trust.
=== MARKDOWN_REPORT ===
# Findings
Summary:
Trust matters most.
Report:
See tables.
[ Themes ]
Metric:";
        let parsed = parse_sections(text);
        assert_eq!(parsed.get(SectionName::ExecutiveSummary), "Adoption hinges on trust.");
        assert_eq!(
            parsed.get(SectionName::MarkdownReport),
            "# Findings\nSummary:\nTrust matters most.\nReport:\nSee tables.\n[ Themes ]\nMetric:"
        );
        assert!(!parsed.has_content(SectionName::ThemesCsv));
        assert!(!parsed.has_content(SectionName::Metrics));
    }

    #[test]
    fn canonical_names_in_loose_form_are_headers() {
        let parsed = parse_sections("EXECUTIVE_SUMMARY:\nShort.\n[ METRICS ]\na: 1");
        assert_eq!(parsed.get(SectionName::ExecutiveSummary), "Short.");
        assert_eq!(parsed.get(SectionName::Metrics), "a: 1");
    }

    #[test]
    fn unknown_strong_headers_go_to_extra() {
        let parsed = parse_sections("=== APPENDIX ===\nnotes\n=== METRICS ===\na: 1");
        assert_eq!(parsed.extra().get("APPENDIX").map(String::as_str), Some("notes"));
        assert_eq!(parsed.get(SectionName::Metrics), "a: 1");
    }

    #[test]
    fn section_content_is_trimmed() {
        let parsed = parse_sections("=== METRICS ===\n\n  a: 1  \n\n");
        assert_eq!(parsed.get(SectionName::Metrics), "a: 1");
    }

    #[test]
    fn normalize_header_folds_spaces_and_hyphens() {
        assert_eq!(normalize_header(" themes  csv "), "THEMES_CSV");
        assert_eq!(normalize_header("quote-chains csv"), "QUOTE_CHAINS_CSV");
    }
}
