//! Prompt construction for the analysis calls.
//!
//! Prompts ask for the flat "simplified" schema; the response pipeline turns
//! that into the full model. Field names here must match what
//! `fix_response_data` and `transform_to_full_schema` read.

use serde_json::{json, Value};

use crate::domain::coding::{InterviewTranscript, Theme};
use crate::domain::response::SectionName;

/// Characters of transcript text offered to each quote-extraction call.
pub const QUOTE_EXCERPT_BUDGET: usize = 24_000;

const ANALYSIS_INSTRUCTIONS: &str = "\
You are an expert qualitative researcher applying grounded theory.
Perform open, axial and selective coding over the interviews below.

Return a single JSON object with these keys:
- themes: list of {theme_id, name, description, prevalence, interviews_count, key_quotes, confidence_score}
- codes: list of {code_id, name, definition, frequency, interviews_present, first_appearance, theme_id, parent_code_id, hierarchy_level}
- quote_chains: list of {chain_id, theme_id, chain_type, description, quotes}
  where chain_type is one of evolution, contradiction, consensus_building, problem_solution
  and each quote is written as \"Speaker (Interview NNN): text\"
- contradictions: list of {contradiction_id, topic, position_a, position_b, position_a_holders, position_b_holders, position_a_quotes, position_b_quotes, resolution_suggestions}
- stakeholder_positions: list of {stakeholder_type, position, supporting_quotes, concerns, recommendations}
- theoretical_insights: list of strings
- emergent_theory, methodological_notes: strings
- saturation_point: the interview id (e.g. INT_012) after which no new codes emerged
- saturation_evidence: string
- overall_confidence: number between 0 and 1

Prevalence is the share of interviews in which a theme appears, between 0 and 1.
Every quote must be verbatim from the transcripts.";

const SECTIONED_INSTRUCTIONS: &str = "\
You are an expert qualitative researcher applying grounded theory.
Analyze the interviews below and answer in plain text. Start every section
with a header line of the form === SECTION_NAME === using exactly these names:";

/// Prompt for the structured JSON analysis.
pub fn analysis_prompt(transcripts: &[InterviewTranscript]) -> String {
    format!(
        "{}\n\n{}",
        ANALYSIS_INSTRUCTIONS,
        render_transcripts(transcripts, None)
    )
}

/// Prompt for the plain-text sectioned report.
pub fn sectioned_report_prompt(transcripts: &[InterviewTranscript]) -> String {
    let names: Vec<&str> = SectionName::ALL.iter().map(|s| s.as_str()).collect();
    format!(
        "{}\n{}\n\nCSV sections must include a header row. The METRICS section lists \
         one `name: value` per line for traceability_completeness, quote_attribution_rate, \
         evidence_strength, theme_coverage and saturation_confidence.\n\n{}",
        SECTIONED_INSTRUCTIONS,
        names.join("\n"),
        render_transcripts(transcripts, None)
    )
}

/// Prompt asking for supporting quotes for one theme.
pub fn quote_extraction_prompt(theme: &Theme, transcripts: &[InterviewTranscript]) -> String {
    format!(
        "Find verbatim quotes from the interviews below that support the theme \
         \"{}\" ({}).\n\
         Theme description: {}\n\n\
         Return a JSON array of strings, each formatted as \
         \"Speaker (Interview NNN): quote text\". Return [] if none apply.\n\n{}",
        theme.name,
        theme.theme_id,
        theme.description,
        render_transcripts(transcripts, Some(QUOTE_EXCERPT_BUDGET))
    )
}

/// Structural hint for the JSON analysis call.
pub fn analysis_response_schema() -> Value {
    let strings = json!({"type": "ARRAY", "items": {"type": "STRING"}});
    json!({
        "type": "OBJECT",
        "properties": {
            "themes": {"type": "ARRAY", "items": {"type": "OBJECT", "properties": {
                "theme_id": {"type": "STRING"},
                "name": {"type": "STRING"},
                "description": {"type": "STRING"},
                "prevalence": {"type": "NUMBER"},
                "interviews_count": {"type": "INTEGER"},
                "key_quotes": strings,
                "confidence_score": {"type": "NUMBER"}
            }}},
            "codes": {"type": "ARRAY", "items": {"type": "OBJECT", "properties": {
                "code_id": {"type": "STRING"},
                "name": {"type": "STRING"},
                "definition": {"type": "STRING"},
                "frequency": {"type": "INTEGER"},
                "interviews_present": strings,
                "first_appearance": {"type": "STRING"},
                "theme_id": {"type": "STRING"},
                "parent_code_id": {"type": "STRING", "nullable": true},
                "hierarchy_level": {"type": "INTEGER"}
            }}},
            "quote_chains": {"type": "ARRAY", "items": {"type": "OBJECT", "properties": {
                "chain_id": {"type": "STRING"},
                "theme_id": {"type": "STRING"},
                "chain_type": {"type": "STRING"},
                "description": {"type": "STRING"},
                "quotes": strings
            }}},
            "theoretical_insights": strings,
            "emergent_theory": {"type": "STRING"},
            "methodological_notes": {"type": "STRING"},
            "saturation_point": {"type": "STRING"},
            "saturation_evidence": {"type": "STRING"},
            "overall_confidence": {"type": "NUMBER"}
        },
        "required": ["themes", "codes"]
    })
}

/// Renders transcripts under interview headers, optionally capped in size.
///
/// The cap is shared evenly between interviews so each keeps its opening.
fn render_transcripts(transcripts: &[InterviewTranscript], budget: Option<usize>) -> String {
    let per_interview = budget.map(|b| b / transcripts.len().max(1));
    transcripts
        .iter()
        .map(|t| {
            let text = match per_interview {
                Some(limit) => truncate_chars(&t.text, limit),
                None => t.text.as_str(),
            };
            format!(
                "=== INTERVIEW {} ({}) ===\n{}\n",
                t.id(),
                t.metadata.file_name,
                text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::InterviewId;

    fn transcript(n: u32, text: &str) -> InterviewTranscript {
        InterviewTranscript::new(InterviewId::from_number(n), format!("int{n}.txt"), text)
    }

    #[test]
    fn analysis_prompt_includes_every_interview() {
        let prompt = analysis_prompt(&[transcript(1, "first"), transcript(2, "second")]);
        assert!(prompt.contains("=== INTERVIEW INT_001 (int1.txt) ===\nfirst"));
        assert!(prompt.contains("=== INTERVIEW INT_002 (int2.txt) ===\nsecond"));
        assert!(prompt.contains("saturation_point"));
    }

    #[test]
    fn sectioned_prompt_lists_every_section() {
        let prompt = sectioned_report_prompt(&[transcript(1, "x")]);
        for section in SectionName::ALL {
            assert!(prompt.contains(section.as_str()));
        }
    }

    #[test]
    fn quote_prompt_names_theme_and_caps_text() {
        let theme = Theme::degraded("T004", "Workload");
        let long = "word ".repeat(20_000);
        let prompt = quote_extraction_prompt(&theme, &[transcript(1, &long)]);
        assert!(prompt.contains("\"Workload\" (T004)"));
        assert!(prompt.len() < QUOTE_EXCERPT_BUDGET + 1_000);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn schema_requires_themes_and_codes() {
        let schema = analysis_response_schema();
        assert_eq!(schema["required"], json!(["themes", "codes"]));
    }
}
