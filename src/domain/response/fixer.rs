//! Fills and normalizes loosely-typed response data before transformation.
//!
//! The fixer never fails: whatever shape comes in, the returned object
//! carries every field the transformer reads. Every correction is logged at
//! warn level.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::domain::foundation::DEFAULT_INTERVIEW_ID;

/// Prevalence used when nothing better can be derived.
pub const DEFAULT_PREVALENCE: f64 = 0.5;

/// Confidence used when nothing better can be derived.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Saturation point used when the response names none.
pub const DEFAULT_SATURATION_POINT: &str = "Not determined";

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number regex is valid"));

/// Descriptive prevalence words, checked in order.
const PREVALENCE_LADDER: [(&[&str], f64); 5] = [
    (&["universal", "all", "every"], 1.0),
    (&["high", "most", "majority"], 0.8),
    (&["medium", "moderate", "some"], 0.5),
    (&["low", "few", "minor"], 0.3),
    (&["rare", "minimal"], 0.1),
];

/// Label for contradictions and stakeholder positions the model left unnamed.
pub const UNSPECIFIED: &str = "Unspecified";

/// Top-level keys and the value injected when a response omits them.
fn top_level_defaults() -> [(&'static str, Value); 11] {
    [
        ("themes", json!([])),
        ("codes", json!([])),
        ("quote_chains", json!([])),
        ("theoretical_insights", json!([])),
        ("emergent_theory", json!("")),
        ("methodological_notes", json!("")),
        ("saturation_point", json!(DEFAULT_SATURATION_POINT)),
        ("saturation_evidence", json!("")),
        ("overall_confidence", json!(DEFAULT_CONFIDENCE)),
        ("contradictions", json!([])),
        ("stakeholder_positions", json!([])),
    ]
}

/// Fills missing fields and normalizes free-text values in a response.
pub fn fix_response_data(mut response: Map<String, Value>) -> Map<String, Value> {
    for (key, default) in top_level_defaults() {
        let present = response.get(key).is_some_and(|v| !v.is_null());
        if !present {
            tracing::warn!(field = key, "Response missing field, using default");
            response.insert(key.to_string(), default);
        }
    }

    for key in [
        "themes",
        "codes",
        "quote_chains",
        "theoretical_insights",
        "contradictions",
        "stakeholder_positions",
    ] {
        ensure_array(&mut response, key);
    }

    if let Some(Value::Array(themes)) = response.get_mut("themes") {
        for (index, theme) in themes.iter_mut().enumerate() {
            if let Value::Object(theme) = theme {
                fix_theme(theme, index);
            }
        }
    }

    if let Some(Value::Array(codes)) = response.get_mut("codes") {
        for (index, code) in codes.iter_mut().enumerate() {
            if let Value::Object(code) = code {
                fix_code(code, index);
            }
        }
    }

    if let Some(Value::Array(insights)) = response.get_mut("theoretical_insights") {
        for (index, insight) in insights.iter_mut().enumerate() {
            if !insight.is_string() {
                tracing::warn!(index, "Coercing theoretical insight to text");
                *insight = Value::String(insight_text(insight));
            }
        }
    }

    if let Some(Value::Array(positions)) = response.get_mut("stakeholder_positions") {
        for (index, position) in positions.iter_mut().enumerate() {
            if let Value::Object(position) = position {
                default_text(position, "stakeholder_type", UNSPECIFIED, "stakeholder_position", index);
                for key in ["supporting_quotes", "concerns", "recommendations"] {
                    default_field(position, key, json!([]), "stakeholder_position", index);
                    ensure_string_list(position, key);
                }
            }
        }
    }

    if let Some(Value::Array(contradictions)) = response.get_mut("contradictions") {
        for (index, contradiction) in contradictions.iter_mut().enumerate() {
            if let Value::Object(contradiction) = contradiction {
                default_text(contradiction, "topic", UNSPECIFIED, "contradiction", index);
                for key in [
                    "position_a_holders",
                    "position_b_holders",
                    "position_a_quotes",
                    "position_b_quotes",
                    "resolution_suggestions",
                ] {
                    default_field(contradiction, key, json!([]), "contradiction", index);
                    ensure_string_list(contradiction, key);
                }
            }
        }
    }

    let confidence = normalize_score(response.get("overall_confidence"), DEFAULT_CONFIDENCE);
    response.insert("overall_confidence".to_string(), json!(confidence));

    response
}

fn fix_theme(theme: &mut Map<String, Value>, index: usize) {
    backfill_id(theme, "theme_id", &format!("T{:03}", index + 1), index);

    default_field(theme, "name", json!(""), "theme", index);
    default_field(theme, "description", json!(""), "theme", index);
    default_field(theme, "prevalence", json!(DEFAULT_PREVALENCE), "theme", index);
    default_field(theme, "interviews_count", json!(1), "theme", index);
    default_field(theme, "key_quotes", json!([]), "theme", index);
    default_field(theme, "confidence_score", json!(DEFAULT_CONFIDENCE), "theme", index);

    let raw_prevalence = theme.get("prevalence").cloned().unwrap_or(Value::Null);
    let prevalence = normalize_prevalence(&raw_prevalence);
    if raw_prevalence.as_f64() != Some(prevalence) {
        tracing::warn!(index, value = %raw_prevalence, normalized = prevalence, "Normalized theme prevalence");
    }
    theme.insert("prevalence".to_string(), json!(prevalence));

    let confidence = normalize_score(theme.get("confidence_score"), DEFAULT_CONFIDENCE);
    theme.insert("confidence_score".to_string(), json!(confidence));

    let count = normalize_count(theme.get("interviews_count"), 1);
    theme.insert("interviews_count".to_string(), json!(count));

    ensure_string_list(theme, "key_quotes");
}

fn fix_code(code: &mut Map<String, Value>, index: usize) {
    backfill_id(code, "code_id", &format!("C{:03}", index + 1), index);

    default_field(code, "name", json!(""), "code", index);
    default_field(code, "definition", json!(""), "code", index);
    default_field(code, "frequency", json!(1), "code", index);
    default_field(code, "interviews_present", json!([]), "code", index);
    default_field(code, "first_appearance", json!(DEFAULT_INTERVIEW_ID), "code", index);
    default_field(code, "theme_id", json!("T001"), "code", index);
    if !code.contains_key("parent_code_id") {
        code.insert("parent_code_id".to_string(), Value::Null);
    }
    default_field(code, "hierarchy_level", json!(0), "code", index);

    let frequency = normalize_count(code.get("frequency"), 1);
    code.insert("frequency".to_string(), json!(frequency));

    let level = normalize_count(code.get("hierarchy_level"), 0);
    code.insert("hierarchy_level".to_string(), json!(level));

    // Blank parent references mean "no parent".
    if code
        .get("parent_code_id")
        .and_then(Value::as_str)
        .is_some_and(|p| p.trim().is_empty())
    {
        code.insert("parent_code_id".to_string(), Value::Null);
    }

    ensure_string_list(code, "interviews_present");
}

fn backfill_id(item: &mut Map<String, Value>, key: &str, generated: &str, index: usize) {
    let numeric = match item.get(key) {
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    if let Some(as_text) = numeric {
        item.insert(key.to_string(), Value::String(as_text));
    }
    let valid = item
        .get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty());
    if !valid {
        tracing::warn!(field = key, index, id = generated, "Assigning missing id");
        item.insert(key.to_string(), Value::String(generated.to_string()));
    }
}

fn default_field(item: &mut Map<String, Value>, key: &str, default: Value, kind: &str, index: usize) {
    if item.get(key).map_or(true, Value::is_null) {
        tracing::warn!(kind, field = key, index, "Missing field, using default");
        item.insert(key.to_string(), default);
    }
}

/// Like [`default_field`], but a blank string also counts as missing.
fn default_text(item: &mut Map<String, Value>, key: &str, default: &str, kind: &str, index: usize) {
    let present = item
        .get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty());
    if !present {
        tracing::warn!(kind, field = key, index, "Missing label, using default");
        item.insert(key.to_string(), Value::String(default.to_string()));
    }
}

fn ensure_array(response: &mut Map<String, Value>, key: &str) {
    let Some(value) = response.get_mut(key) else {
        return;
    };
    match value {
        Value::Array(_) => {}
        Value::Object(_) => {
            tracing::warn!(field = key, "Wrapping single object in a list");
            let single = value.take();
            *value = Value::Array(vec![single]);
        }
        _ => {
            tracing::warn!(field = key, value = %value, "Replacing non-list value with empty list");
            *value = Value::Array(Vec::new());
        }
    }
}

/// Coerces a field into a list of strings.
fn ensure_string_list(item: &mut Map<String, Value>, key: &str) {
    let Some(value) = item.get_mut(key) else {
        return;
    };
    let list = match value.take() {
        Value::Array(items) => items
            .into_iter()
            .filter(|v| !v.is_null())
            .map(|v| match v {
                Value::String(s) => s,
                other => insight_text(&other),
            })
            .collect(),
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::String(s) => vec![s],
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    };
    *value = json!(list);
}

fn insight_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("insight")
            .or_else(|| obj.get("description"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

/// Converts any prevalence expression into a share within [0, 1].
///
/// Descriptive words map onto a fixed ladder. Otherwise numbers are read
/// from the text: `15 of 18` is a ratio, a single number above 1 is a
/// percentage, and text without numbers falls back to the default.
pub fn normalize_prevalence(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64().map(scale_share),
        Value::String(s) => Some(prevalence_from_text(s)),
        _ => None,
    };
    clamp_unit(raw.unwrap_or(DEFAULT_PREVALENCE))
}

fn prevalence_from_text(text: &str) -> f64 {
    let lowered = text.to_lowercase();

    for (words, share) in PREVALENCE_LADDER {
        if words.iter().any(|w| lowered.contains(w)) {
            return share;
        }
    }

    let numbers: Vec<(usize, usize, f64)> = NUMBER
        .find_iter(&lowered)
        .filter_map(|m| m.as_str().parse::<f64>().ok().map(|n| (m.start(), m.end(), n)))
        .collect();

    match numbers.as_slice() {
        [] => DEFAULT_PREVALENCE,
        [(_, first_end, numerator), (second_start, _, denominator), ..]
            if lowered[*first_end..*second_start].contains(" of ") =>
        {
            if *denominator > 0.0 {
                numerator / denominator
            } else {
                DEFAULT_PREVALENCE
            }
        }
        [(_, _, n), ..] => scale_share(*n),
    }
}

fn scale_share(n: f64) -> f64 {
    if n > 1.0 {
        n / 100.0
    } else {
        n
    }
}

fn clamp_unit(n: f64) -> f64 {
    if n.is_finite() {
        n.clamp(0.0, 1.0)
    } else {
        DEFAULT_PREVALENCE
    }
}

/// Reads a score within [0, 1] from a number or numeric text.
pub fn normalize_score(value: Option<&Value>, default: f64) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => NUMBER
            .find(s)
            .and_then(|m| m.as_str().parse::<f64>().ok()),
        _ => None,
    };
    match raw {
        Some(n) if n.is_finite() => scale_share(n).clamp(0.0, 1.0),
        _ => default,
    }
}

fn normalize_count(value: Option<&Value>, default: u64) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .unwrap_or(default),
        Some(Value::String(s)) => NUMBER
            .find(s)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(|f| f.round() as u64)
            .unwrap_or(default),
        _ => default,
    }
}
