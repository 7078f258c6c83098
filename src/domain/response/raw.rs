//! The raw LLM response boundary.
//!
//! A provider hands back JSON text, free text with section markers, or an
//! already-decoded value. Nothing past this module sees the raw form.

use serde_json::{Map, Value};

use super::errors::ResponseError;
use super::repair::repair;
use super::sections::{parse_sections, ParsedSections};

/// A response exactly as the provider produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawLlmResponse {
    /// Text that was requested as JSON.
    Json(String),
    /// Plain text, possibly with section headers.
    Text(String),
    /// A value the provider already decoded.
    Value(Value),
}

impl RawLlmResponse {
    /// Returns the textual body, if the response is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawLlmResponse::Json(text) | RawLlmResponse::Text(text) => Some(text),
            RawLlmResponse::Value(Value::String(text)) => Some(text),
            RawLlmResponse::Value(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RawLlmResponse::Value(Value::Null) => true,
            RawLlmResponse::Value(Value::String(text))
            | RawLlmResponse::Json(text)
            | RawLlmResponse::Text(text) => text.trim().is_empty(),
            RawLlmResponse::Value(_) => false,
        }
    }

    /// Decodes the response into any JSON value, repairing text if needed.
    pub fn into_json_value(self) -> Result<Value, ResponseError> {
        if self.is_empty() {
            return Err(ResponseError::Empty);
        }
        match self {
            RawLlmResponse::Json(text)
            | RawLlmResponse::Text(text)
            | RawLlmResponse::Value(Value::String(text)) => parse_json_lenient(&text),
            RawLlmResponse::Value(value) => Ok(value),
        }
    }

    /// Decodes the response into a JSON object.
    ///
    /// A top-level array holding exactly one object is unwrapped; any other
    /// non-object is rejected.
    pub fn into_json_object(self) -> Result<Map<String, Value>, ResponseError> {
        match self.into_json_value()? {
            Value::Object(map) => Ok(map),
            Value::Array(mut items) if items.len() == 1 && items[0].is_object() => {
                tracing::warn!("Unwrapping single-element array response");
                match items.pop() {
                    Some(Value::Object(map)) => Ok(map),
                    _ => Err(ResponseError::unexpected_shape("array")),
                }
            }
            other => Err(ResponseError::unexpected_shape(shape_of(&other))),
        }
    }

    /// Splits a plain-text response into its canonical sections.
    pub fn into_sections(self) -> ParsedSections {
        match self.as_text() {
            Some(text) => parse_sections(text),
            None => {
                tracing::warn!("Structured response has no sections, returning empty set");
                ParsedSections::default()
            }
        }
    }
}

/// Parses JSON out of LLM text, applying repair once if the first try fails.
pub fn parse_json_lenient(text: &str) -> Result<Value, ResponseError> {
    if text.trim().is_empty() {
        return Err(ResponseError::Empty);
    }
    let candidate = extract_json_candidate(text);

    match serde_json::from_str(&candidate) {
        Ok(value) => Ok(value),
        Err(first) => {
            tracing::debug!(error = %first, "Response is not valid JSON, attempting repair");
            let repaired = repair(&candidate);
            serde_json::from_str(&repaired)
                .map(|value| {
                    tracing::info!("Parsed response after repair");
                    value
                })
                .map_err(|second| {
                    tracing::warn!(error = %second, "Response still invalid after repair");
                    ResponseError::parse(second.to_string(), &candidate)
                })
        }
    }
}

/// Finds the JSON payload in a response that may carry fences or prose.
pub fn extract_json_candidate(text: &str) -> String {
    let trimmed = text.trim().trim_start_matches('\u{feff}');

    if let Some(fenced) = extract_from_code_block(trimmed) {
        return fenced;
    }

    let obj_start = trimmed.find('{');
    let arr_start = trimmed.find('[');
    let (start, open, close) = match (obj_start, arr_start) {
        (Some(o), Some(a)) if a < o => (a, '[', ']'),
        (Some(o), _) => (o, '{', '}'),
        (None, Some(a)) => (a, '[', ']'),
        (None, None) => return trimmed.to_string(),
    };

    // A truncated payload has no balanced end; hand the tail to repair.
    extract_balanced_json(trimmed, start, open, close)
        .unwrap_or_else(|| trimmed[start..].to_string())
}

fn extract_from_code_block(s: &str) -> Option<String> {
    let patterns = ["```json\n", "```json\r\n", "```JSON\n", "```\n", "```\r\n"];

    for pattern in patterns {
        if let Some(start) = s.find(pattern) {
            let body_start = start + pattern.len();
            if let Some(end) = s[body_start..].find("```") {
                return Some(s[body_start..body_start + end].trim().to_string());
            }
        }
    }
    None
}

fn extract_balanced_json(s: &str, start: usize, open: char, close: char) -> Option<String> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Some(s[start..end].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
