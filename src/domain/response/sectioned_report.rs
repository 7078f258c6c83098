//! Plain-text analysis reports split into sections.

use serde_json::Value;

use super::metrics::{extract_metrics, QualityMetrics};
use super::raw::parse_json_lenient;
use super::sections::{parse_sections, ParsedSections, SectionName};

/// A plain-text report with its metrics and embedded JSON decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionedReport {
    pub sections: ParsedSections,
    pub metrics: QualityMetrics,
    /// Decoded `COMPLETE_QUOTE_INVENTORY_JSON`, if it parsed.
    pub quote_inventory: Option<Value>,
    /// Decoded `INTERVIEW_SUMMARIES_JSON`, if it parsed.
    pub interview_summaries: Option<Value>,
}

impl SectionedReport {
    pub fn from_text(text: &str) -> Self {
        Self::from_sections(parse_sections(text))
    }

    pub fn from_sections(sections: ParsedSections) -> Self {
        let metrics = QualityMetrics::from_map(extract_metrics(sections.get(SectionName::Metrics)));
        let quote_inventory = decode_section(&sections, SectionName::CompleteQuoteInventoryJson);
        let interview_summaries = decode_section(&sections, SectionName::InterviewSummariesJson);

        Self {
            sections,
            metrics,
            quote_inventory,
            interview_summaries,
        }
    }

    /// File name and body for every section with content.
    ///
    /// JSON sections are pretty-printed when they decoded; everything else
    /// is written as the model produced it, minus code fences.
    pub fn output_files(&self) -> Vec<(&'static str, String)> {
        SectionName::ALL
            .iter()
            .filter(|name| self.sections.has_content(**name))
            .map(|name| {
                let decoded = match name {
                    SectionName::CompleteQuoteInventoryJson => self.quote_inventory.as_ref(),
                    SectionName::InterviewSummariesJson => self.interview_summaries.as_ref(),
                    _ => None,
                };
                let body = decoded
                    .and_then(|value| serde_json::to_string_pretty(value).ok())
                    .unwrap_or_else(|| strip_fences(self.sections.get(*name)).to_string());
                (file_name(*name), body)
            })
            .collect()
    }
}

/// Output file for a section.
pub fn file_name(section: SectionName) -> &'static str {
    match section {
        SectionName::ThemesCsv => "themes.csv",
        SectionName::CodesCsv => "codes.csv",
        SectionName::QuotesCsv => "quotes.csv",
        SectionName::QuoteChainsCsv => "quote_chains.csv",
        SectionName::ContradictionsCsv => "contradictions.csv",
        SectionName::StakeholderPositionsCsv => "stakeholder_positions.csv",
        SectionName::SaturationCurveCsv => "saturation_curve.csv",
        SectionName::TraceabilityMatrixCsv => "traceability_matrix.csv",
        SectionName::MarkdownReport => "report.md",
        SectionName::ExecutiveSummary => "executive_summary.md",
        SectionName::CompleteQuoteInventoryJson => "quote_inventory.json",
        SectionName::InterviewSummariesJson => "interview_summaries.json",
        SectionName::Metrics => "metrics.txt",
    }
}

fn decode_section(sections: &ParsedSections, name: SectionName) -> Option<Value> {
    if !sections.has_content(name) {
        return None;
    }
    match parse_json_lenient(sections.get(name)) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(section = %name, error = %err, "Could not decode JSON section");
            None
        }
    }
}

/// Removes a surrounding ``` fence, with or without a language tag.
fn strip_fences(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => inner.trim(),
    }
}
