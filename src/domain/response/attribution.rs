//! Attribution of free-text quotes to speakers and interviews.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::coding::QuoteEvidence;
use crate::domain::foundation::InterviewId;

const UNKNOWN_SPEAKER: &str = "Unknown";

/// `Speaker Name (Interview 003): text`
static SPEAKER_INTERVIEW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*([^():]+?)\s*\(\s*interview\s*#?\s*(\d+)\s*\)\s*:\s*(.+?)\s*$")
        .expect("speaker attribution regex is valid")
});

/// `Interview 003: text` or `INT_003: text`
static INTERVIEW_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*(?:interview\s*#?\s*|int_)(\d+)\s*:\s*(.+?)\s*$")
        .expect("interview attribution regex is valid")
});

/// Parses a loosely formatted quote into attributed evidence.
///
/// Tries the speaker form first, then the bare interview form; otherwise
/// the whole string becomes the quote text, attributed to `INT_001`.
/// Interview numbers are always rendered as `INT_` plus three digits.
pub fn parse_quote(raw: &str, quote_id: impl Into<String>, context: impl Into<String>) -> QuoteEvidence {
    let quote_id = quote_id.into();
    let context = context.into();

    if let Some(caps) = SPEAKER_INTERVIEW.captures(raw) {
        let speaker = caps.get(1).map(|m| m.as_str().trim()).unwrap_or(UNKNOWN_SPEAKER);
        let text = strip_quote_marks(caps.get(3).map(|m| m.as_str()).unwrap_or(""));
        return QuoteEvidence {
            quote_id,
            text: format!("{}: {}", speaker, text),
            interview_id: interview_from_digits(caps.get(2).map(|m| m.as_str())),
            line_numbers: None,
            speaker_role: speaker.to_string(),
            context,
        };
    }

    if let Some(caps) = INTERVIEW_ONLY.captures(raw) {
        return QuoteEvidence {
            quote_id,
            text: strip_quote_marks(caps.get(2).map(|m| m.as_str()).unwrap_or("")).to_string(),
            interview_id: interview_from_digits(caps.get(1).map(|m| m.as_str())),
            line_numbers: None,
            speaker_role: UNKNOWN_SPEAKER.to_string(),
            context,
        };
    }

    tracing::debug!(quote = raw, "Quote has no attribution, defaulting interview");
    QuoteEvidence {
        quote_id,
        text: strip_quote_marks(raw).to_string(),
        interview_id: InterviewId::default(),
        line_numbers: None,
        speaker_role: UNKNOWN_SPEAKER.to_string(),
        context,
    }
}

fn interview_from_digits(digits: Option<&str>) -> InterviewId {
    digits
        .and_then(|d| d.parse::<u32>().ok())
        .map(InterviewId::from_number)
        .unwrap_or_default()
}

/// Removes one layer of surrounding quote marks and whitespace.
fn strip_quote_marks(text: &str) -> &str {
    let trimmed = text.trim();
    const MARKS: [(char, char); 4] = [('"', '"'), ('\'', '\''), ('“', '”'), ('‘', '’')];
    for (open, close) in MARKS {
        if let Some(inner) = trimmed
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.trim();
        }
    }
    trimmed
}
