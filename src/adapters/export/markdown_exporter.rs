//! Markdown report rendering.
//!
//! Produces a human-readable report of the analysis graph. Sections with no
//! content are omitted rather than rendered empty.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::write_atomic;
use crate::domain::coding::{Code, FullAnalysis};
use crate::domain::response::TransformReport;
use crate::ports::{AnalysisExporter, ExportError};

pub const MARKDOWN_FILE_NAME: &str = "analysis_report.md";

#[derive(Debug, Clone, Default)]
pub struct MarkdownReportExporter;

impl MarkdownReportExporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AnalysisExporter for MarkdownReportExporter {
    async fn export(
        &self,
        analysis: &FullAnalysis,
        report: &TransformReport,
        output_dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let path = output_dir.join(MARKDOWN_FILE_NAME);
        write_atomic(&path, &render_markdown(analysis, report)).await?;
        tracing::info!(path = %path.display(), "Wrote markdown report");
        Ok(path)
    }

    fn format_name(&self) -> &'static str {
        "markdown"
    }
}

/// Renders the full report.
pub fn render_markdown(analysis: &FullAnalysis, report: &TransformReport) -> String {
    let mut doc = String::from("# Qualitative Analysis Report\n\n");
    let meta = &analysis.metadata;

    doc.push_str(&format!(
        "**Interviews analyzed:** {} ({} words)  \n",
        meta.total_interviews, meta.total_words
    ));
    doc.push_str(&format!("**Model:** {}  \n", meta.model));
    doc.push_str(&format!(
        "**Analyzed at:** {}  \n",
        meta.analyzed_at.report_label()
    ));
    doc.push_str(&format!(
        "**Overall confidence:** {:.0}%\n\n",
        analysis.overall_confidence * 100.0
    ));

    doc.push_str(&render_themes(analysis));
    doc.push_str(&render_code_hierarchy(analysis));
    doc.push_str(&render_quote_chains(analysis));
    doc.push_str(&render_contradictions(analysis));
    doc.push_str(&render_stakeholders(analysis));
    doc.push_str(&render_theory(analysis));
    doc.push_str(&render_processing_notes(report));
    doc
}

fn render_themes(analysis: &FullAnalysis) -> String {
    if analysis.themes.is_empty() {
        return String::from("## Themes\n\n*No themes identified*\n\n");
    }

    let mut section = String::from("## Themes\n\n");
    section.push_str("| ID | Theme | Prevalence | Interviews | Confidence |\n");
    section.push_str("|----|-------|------------|------------|------------|\n");
    for theme in &analysis.themes {
        section.push_str(&format!(
            "| {} | {} | {:.0}% | {} | {:.2} |\n",
            theme.theme_id,
            escape_cell(&theme.name),
            theme.prevalence * 100.0,
            theme.interviews_count,
            theme.confidence_score
        ));
    }
    section.push('\n');

    for theme in &analysis.themes {
        section.push_str(&format!("### {} ({})\n\n", theme.name, theme.theme_id));
        if !theme.description.is_empty() {
            section.push_str(&format!("{}\n\n", theme.description));
        }
        let code_names: Vec<&str> = theme
            .associated_codes
            .iter()
            .filter_map(|id| analysis.code(id))
            .map(|code| code.name.as_str())
            .collect();
        if !code_names.is_empty() {
            section.push_str(&format!("**Codes:** {}\n\n", code_names.join(", ")));
        }
        for quote in &theme.key_quotes {
            section.push_str(&format!("> {}\n\n", quote));
        }
    }
    section
}

fn render_code_hierarchy(analysis: &FullAnalysis) -> String {
    if analysis.codes.is_empty() {
        return String::new();
    }

    let mut section = String::from("## Code Hierarchy\n\n");
    let is_listed_root = |code: &Code| match &code.parent_code_id {
        None => true,
        // Orphans are listed at the top level.
        Some(parent) => analysis.code(parent).is_none(),
    };
    for root in analysis.codes.iter().filter(|c| is_listed_root(*c)) {
        push_code(&mut section, analysis, root, 0, &mut Vec::new());
    }
    section.push('\n');
    section
}

fn push_code<'a>(
    section: &mut String,
    analysis: &'a FullAnalysis,
    code: &'a Code,
    depth: usize,
    path: &mut Vec<&'a str>,
) {
    if path.contains(&code.code_id.as_str()) {
        return;
    }
    section.push_str(&format!(
        "{}- **{}** `{}` (frequency {}): {}\n",
        "  ".repeat(depth),
        code.name,
        code.code_id,
        code.frequency,
        code.definition
    ));
    path.push(&code.code_id);
    for child in code.child_codes.iter().filter_map(|id| analysis.code(id)) {
        push_code(section, analysis, child, depth + 1, path);
    }
    path.pop();
}

fn render_quote_chains(analysis: &FullAnalysis) -> String {
    if analysis.quote_chains.is_empty() {
        return String::new();
    }

    let mut section = String::from("## Quote Chains\n\n");
    for chain in &analysis.quote_chains {
        section.push_str(&format!(
            "### {} ({}, theme {})\n\n",
            chain.chain_id, chain.chain_type, chain.theme_id
        ));
        if !chain.description.is_empty() {
            section.push_str(&format!("{}\n\n", chain.description));
        }
        for (n, quote) in chain.quotes.iter().enumerate() {
            section.push_str(&format!(
                "{}. \"{}\" ({}, {})\n",
                n + 1,
                quote.text,
                quote.interview_id,
                quote.speaker_role
            ));
        }
        section.push('\n');
    }
    section
}

fn render_contradictions(analysis: &FullAnalysis) -> String {
    if analysis.contradictions.is_empty() {
        return String::new();
    }

    let mut section = String::from("## Contradictions\n\n");
    for c in &analysis.contradictions {
        section.push_str(&format!("### {}\n\n", c.topic));
        section.push_str(&format!(
            "- **Position A:** {} ({})\n",
            c.position_a,
            c.position_a_holders.join(", ")
        ));
        section.push_str(&format!(
            "- **Position B:** {} ({})\n",
            c.position_b,
            c.position_b_holders.join(", ")
        ));
        for suggestion in &c.resolution_suggestions {
            section.push_str(&format!("- *Resolution:* {}\n", suggestion));
        }
        section.push('\n');
    }
    section
}

fn render_stakeholders(analysis: &FullAnalysis) -> String {
    if analysis.stakeholder_positions.is_empty() {
        return String::new();
    }

    let mut section = String::from("## Stakeholder Positions\n\n");
    section.push_str("| Stakeholder | Position | Concerns | Recommendations |\n");
    section.push_str("|-------------|----------|----------|-----------------|\n");
    for p in &analysis.stakeholder_positions {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            escape_cell(&p.stakeholder_type),
            escape_cell(&p.position),
            escape_cell(&p.concerns.join("; ")),
            escape_cell(&p.recommendations.join("; "))
        ));
    }
    section.push('\n');
    section
}

fn render_theory(analysis: &FullAnalysis) -> String {
    let mut section = String::from("## Saturation\n\n");
    let saturation = &analysis.saturation;
    match saturation.interview_number {
        Some(n) => section.push_str(&format!(
            "Reached at **{}** (interview {}).\n\n",
            saturation.saturation_point, n
        )),
        None => section.push_str(&format!("**{}**\n\n", saturation.saturation_point)),
    }
    if !saturation.evidence.is_empty() {
        section.push_str(&format!("{}\n\n", saturation.evidence));
    }

    if !analysis.theoretical_insights.is_empty() {
        section.push_str("## Theoretical Insights\n\n");
        for insight in &analysis.theoretical_insights {
            section.push_str(&format!("- {}\n", insight));
        }
        section.push('\n');
    }
    if !analysis.emergent_theory.is_empty() {
        section.push_str(&format!("## Emergent Theory\n\n{}\n\n", analysis.emergent_theory));
    }
    if !analysis.methodological_notes.is_empty() {
        section.push_str(&format!(
            "## Methodological Notes\n\n{}\n\n",
            analysis.methodological_notes
        ));
    }
    section
}

fn render_processing_notes(report: &TransformReport) -> String {
    if report.is_clean() {
        return String::new();
    }

    let mut section = String::from("## Processing Notes\n\n");
    section.push_str(&format!(
        "{} item(s) degraded, {} item(s) dropped during processing.\n\n",
        report.degraded_count(),
        report.dropped_count()
    ));
    for err in &report.degraded {
        section.push_str(&format!("- degraded {}\n", err));
    }
    for err in &report.dropped {
        section.push_str(&format!("- dropped {}\n", err));
    }
    section.push('\n');
    section
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
