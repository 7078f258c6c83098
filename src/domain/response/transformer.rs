//! Shapes a fixed response object into the full analysis model.
//!
//! Every collection is reduced item by item: successes are kept in input
//! order, failures are recorded in a [`TransformReport`] and then either
//! replaced by a degraded record or dropped, depending on the kind's
//! [`FailurePolicy`]. Nothing in here returns an error.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use super::attribution::parse_quote;
use super::fixer::{normalize_prevalence, normalize_score, DEFAULT_CONFIDENCE, DEFAULT_SATURATION_POINT};
use crate::domain::coding::{
    AnalysisMetadata, ChainType, Code, ContradictionPair, FullAnalysis, QuoteChain, QuoteEvidence,
    SaturationAssessment, StakeholderPosition, Theme,
};
use crate::domain::foundation::InterviewId;

/// Entity kinds that are converted one item at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Theme,
    Code,
    QuoteChain,
    Contradiction,
    StakeholderPosition,
}

/// What happens to an item that fails conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Replace it with a minimal valid record.
    Degrade,
    /// Leave it out of the output.
    Drop,
}

impl ItemKind {
    /// Themes and codes are referenced by id elsewhere and must survive;
    /// the rest are dropped when they cannot be read.
    pub fn failure_policy(self) -> FailurePolicy {
        match self {
            ItemKind::Theme | ItemKind::Code => FailurePolicy::Degrade,
            ItemKind::QuoteChain | ItemKind::Contradiction | ItemKind::StakeholderPosition => {
                FailurePolicy::Drop
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Theme => "theme",
            ItemKind::Code => "code",
            ItemKind::QuoteChain => "quote_chain",
            ItemKind::Contradiction => "contradiction",
            ItemKind::StakeholderPosition => "stakeholder_position",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single item that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind} #{index}: {reason}")]
pub struct ItemError {
    pub kind: ItemKind,
    /// Position in the input collection.
    pub index: usize,
    pub reason: String,
}

/// Per-item failures absorbed during transformation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformReport {
    pub degraded: Vec<ItemError>,
    pub dropped: Vec<ItemError>,
}

impl TransformReport {
    /// Returns true if every item converted cleanly.
    pub fn is_clean(&self) -> bool {
        self.degraded.is_empty() && self.dropped.is_empty()
    }

    pub fn degraded_count(&self) -> usize {
        self.degraded.len()
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    /// Number of failures recorded for one kind.
    pub fn failures_for(&self, kind: ItemKind) -> usize {
        self.degraded
            .iter()
            .chain(self.dropped.iter())
            .filter(|e| e.kind == kind)
            .count()
    }

    fn record(&mut self, error: ItemError, policy: FailurePolicy) {
        match policy {
            FailurePolicy::Degrade => {
                tracing::warn!(kind = %error.kind, index = error.index, reason = %error.reason, "Degraded item");
                self.degraded.push(error);
            }
            FailurePolicy::Drop => {
                tracing::warn!(kind = %error.kind, index = error.index, reason = %error.reason, "Dropped item");
                self.dropped.push(error);
            }
        }
    }
}

type Converted<T> = Result<T, String>;

/// Transforms a fixed response object into a [`FullAnalysis`].
///
/// Derived indices (theme to codes, parent to child codes) are rebuilt from
/// the converted items; anything the model supplied for them is ignored.
pub fn transform_to_full_schema(
    simple: &Map<String, Value>,
    metadata: AnalysisMetadata,
) -> (FullAnalysis, TransformReport) {
    let mut report = TransformReport::default();

    let mut themes = reduce(
        items(simple, "themes"),
        ItemKind::Theme,
        &mut report,
        convert_theme,
        |index, raw| Some(degraded_theme(index, raw)),
    );
    let mut codes = reduce(
        items(simple, "codes"),
        ItemKind::Code,
        &mut report,
        convert_code,
        |index, raw| Some(degraded_code(index, raw)),
    );
    let quote_chains = reduce(
        items(simple, "quote_chains"),
        ItemKind::QuoteChain,
        &mut report,
        convert_chain,
        |_, _| None,
    );
    let contradictions = reduce(
        items(simple, "contradictions"),
        ItemKind::Contradiction,
        &mut report,
        convert_contradiction,
        |_, _| None,
    );
    let stakeholder_positions = reduce(
        items(simple, "stakeholder_positions"),
        ItemKind::StakeholderPosition,
        &mut report,
        convert_stakeholder,
        |_, _| None,
    );

    let theme_code_map = build_theme_code_map(&themes, &codes);
    for theme in &mut themes {
        theme.associated_codes = theme_code_map.get(&theme.theme_id).cloned().unwrap_or_default();
    }
    break_parent_cycles(&mut codes, &mut report);
    link_child_codes(&mut codes);

    let fallback = (metadata.total_interviews > 0).then_some(metadata.total_interviews);
    let saturation = SaturationAssessment::from_point(
        text_or(simple, "saturation_point", DEFAULT_SATURATION_POINT),
        text_or(simple, "saturation_evidence", ""),
        fallback,
    );

    let analysis = FullAnalysis {
        themes,
        codes,
        quote_chains,
        contradictions,
        stakeholder_positions,
        theoretical_insights: string_list(simple.get("theoretical_insights")),
        emergent_theory: text_or(simple, "emergent_theory", ""),
        methodological_notes: text_or(simple, "methodological_notes", ""),
        saturation,
        overall_confidence: normalize_score(simple.get("overall_confidence"), DEFAULT_CONFIDENCE),
        theme_code_map,
        metadata,
    };

    if !report.is_clean() {
        tracing::info!(
            degraded = report.degraded_count(),
            dropped = report.dropped_count(),
            "Transformation completed with item failures"
        );
    }

    (analysis, report)
}

/// Collects successes and applies the kind's failure policy to the rest.
fn reduce<T>(
    raw_items: &[Value],
    kind: ItemKind,
    report: &mut TransformReport,
    convert: impl Fn(usize, &Value) -> Converted<T>,
    degrade: impl Fn(usize, &Value) -> Option<T>,
) -> Vec<T> {
    raw_items
        .iter()
        .enumerate()
        .fold(Vec::with_capacity(raw_items.len()), |mut out, (index, raw)| {
            match convert(index, raw) {
                Ok(item) => out.push(item),
                Err(reason) => {
                    let error = ItemError { kind, index, reason };
                    let fallback = match kind.failure_policy() {
                        FailurePolicy::Degrade => degrade(index, raw),
                        FailurePolicy::Drop => None,
                    };
                    match fallback {
                        Some(item) => {
                            report.record(error, FailurePolicy::Degrade);
                            out.push(item);
                        }
                        None => report.record(error, FailurePolicy::Drop),
                    }
                }
            }
            out
        })
}

fn convert_theme(index: usize, raw: &Value) -> Converted<Theme> {
    let obj = object(raw)?;
    let theme_id = required_text(obj, "theme_id")?;
    let name = required_text(obj, "name")?;

    Ok(Theme {
        theme_id,
        name,
        description: optional_text(obj, "description"),
        prevalence: normalize_prevalence(obj.get("prevalence").unwrap_or(&Value::Null)),
        interviews_count: count(obj.get("interviews_count"), 1)
            .ok_or_else(|| format!("theme {index} has an invalid interviews_count"))?,
        key_quotes: string_list(obj.get("key_quotes")),
        confidence_score: normalize_score(obj.get("confidence_score"), DEFAULT_CONFIDENCE),
        associated_codes: Vec::new(),
    })
}

fn degraded_theme(index: usize, raw: &Value) -> Theme {
    let obj = raw.as_object();
    let theme_id = obj
        .and_then(|o| non_blank(o, "theme_id"))
        .unwrap_or_else(|| format!("T{:03}", index + 1));
    let name = obj
        .and_then(|o| non_blank(o, "name"))
        .unwrap_or_else(|| format!("Unnamed theme {}", index + 1));
    Theme::degraded(theme_id, name)
}

fn convert_code(_index: usize, raw: &Value) -> Converted<Code> {
    let obj = object(raw)?;
    let code_id = required_text(obj, "code_id")?;
    let name = required_text(obj, "name")?;

    let interviews_present = string_list(obj.get("interviews_present"))
        .into_iter()
        .filter_map(interview_id)
        .collect();
    let first_appearance = non_blank(obj, "first_appearance")
        .and_then(interview_id)
        .unwrap_or_default();
    let parent_code_id = non_blank(obj, "parent_code_id").filter(|parent| *parent != code_id);

    Ok(Code {
        code_id,
        name,
        definition: optional_text(obj, "definition"),
        frequency: count(obj.get("frequency"), 1).ok_or("invalid frequency")?,
        interviews_present,
        first_appearance,
        theme_id: non_blank(obj, "theme_id").unwrap_or_else(|| "T001".to_string()),
        parent_code_id,
        hierarchy_level: count(obj.get("hierarchy_level"), 0).ok_or("invalid hierarchy_level")?,
        child_codes: Vec::new(),
    })
}

fn degraded_code(index: usize, raw: &Value) -> Code {
    let obj = raw.as_object();
    let code_id = obj
        .and_then(|o| non_blank(o, "code_id"))
        .unwrap_or_else(|| format!("C{:03}", index + 1));
    let name = obj
        .and_then(|o| non_blank(o, "name"))
        .unwrap_or_else(|| format!("Unnamed code {}", index + 1));
    let mut code = Code::degraded(code_id, name);
    if let Some(theme_id) = obj.and_then(|o| non_blank(o, "theme_id")) {
        code.theme_id = theme_id;
    }
    code
}

fn convert_chain(index: usize, raw: &Value) -> Converted<QuoteChain> {
    let obj = object(raw)?;
    let theme_id = required_text(obj, "theme_id")?;
    let chain_id = non_blank(obj, "chain_id").unwrap_or_else(|| format!("QC{:03}", index + 1));
    let description = optional_text(obj, "description");
    let chain_type = ChainType::normalize(&optional_text(obj, "chain_type"));

    let raw_quotes = obj
        .get("quotes")
        .ok_or("missing quotes")?
        .as_array()
        .ok_or("quotes is not a list")?;

    let quotes = raw_quotes
        .iter()
        .enumerate()
        .map(|(n, quote)| convert_quote(quote, format!("{}_Q{:02}", chain_id, n + 1), &theme_id))
        .collect::<Converted<Vec<_>>>()?;

    Ok(QuoteChain {
        chain_id,
        theme_id,
        chain_type,
        description,
        quotes,
    })
}

fn convert_quote(raw: &Value, quote_id: String, context: &str) -> Converted<QuoteEvidence> {
    match raw {
        Value::String(text) => Ok(parse_quote(text, quote_id, context)),
        Value::Object(obj) => {
            let text = required_text(obj, "text")?;
            let mut quote = parse_quote(&text, quote_id, context);
            if let Some(id) = non_blank(obj, "interview_id").and_then(|id| InterviewId::new(id).ok()) {
                quote.interview_id = id;
            }
            if let Some(role) = non_blank(obj, "speaker_role") {
                quote.speaker_role = role;
            }
            if let Some(lines) = obj.get("line_numbers").and_then(Value::as_array) {
                quote.line_numbers = Some(
                    lines
                        .iter()
                        .filter_map(Value::as_u64)
                        .filter_map(|n| u32::try_from(n).ok())
                        .collect(),
                );
            }
            Ok(quote)
        }
        other => Err(format!("quote is not text: {other}")),
    }
}

fn convert_contradiction(index: usize, raw: &Value) -> Converted<ContradictionPair> {
    let obj = object(raw)?;
    Ok(ContradictionPair {
        contradiction_id: non_blank(obj, "contradiction_id")
            .unwrap_or_else(|| format!("CON{:03}", index + 1)),
        topic: required_text(obj, "topic")?,
        position_a: optional_text(obj, "position_a"),
        position_b: optional_text(obj, "position_b"),
        position_a_holders: string_list(obj.get("position_a_holders")),
        position_b_holders: string_list(obj.get("position_b_holders")),
        position_a_quotes: string_list(obj.get("position_a_quotes")),
        position_b_quotes: string_list(obj.get("position_b_quotes")),
        resolution_suggestions: string_list(obj.get("resolution_suggestions")),
    })
}

fn convert_stakeholder(_index: usize, raw: &Value) -> Converted<StakeholderPosition> {
    let obj = object(raw)?;
    Ok(StakeholderPosition {
        stakeholder_type: required_text(obj, "stakeholder_type")?,
        position: optional_text(obj, "position"),
        supporting_quotes: string_list(obj.get("supporting_quotes")),
        concerns: string_list(obj.get("concerns")),
        recommendations: string_list(obj.get("recommendations")),
    })
}

/// Theme id to the ids of its codes, both in input order.
fn build_theme_code_map(themes: &[Theme], codes: &[Code]) -> BTreeMap<String, Vec<String>> {
    themes
        .iter()
        .map(|theme| {
            let owned = codes
                .iter()
                .filter(|code| code.theme_id == theme.theme_id)
                .map(|code| code.code_id.clone())
                .collect();
            (theme.theme_id.clone(), owned)
        })
        .collect()
}

/// Canonical ids are re-padded (`INT_7` -> `INT_007`); anything else is kept verbatim.
fn interview_id(raw: String) -> Option<InterviewId> {
    InterviewId::parse_canonical(&raw)
        .or_else(|_| InterviewId::new(raw))
        .ok()
}

/// Keeps the code hierarchy acyclic.
///
/// Codes are visited in input order; a code whose parent chain leads back
/// to itself loses its parent and becomes a root. Chains that loop without
/// returning to the start are left for the code that closes them.
fn break_parent_cycles(codes: &mut [Code], report: &mut TransformReport) {
    let positions: HashMap<String, usize> = codes
        .iter()
        .enumerate()
        .map(|(i, code)| (code.code_id.clone(), i))
        .collect();

    for start in 0..codes.len() {
        let mut seen = HashSet::from([start]);
        let mut cursor = codes[start]
            .parent_code_id
            .as_ref()
            .and_then(|parent| positions.get(parent).copied());

        while let Some(current) = cursor {
            if current == start {
                let parent = codes[start].parent_code_id.take().unwrap_or_default();
                report.record(
                    ItemError {
                        kind: ItemKind::Code,
                        index: start,
                        reason: format!(
                            "parent {} closes a cycle back to {}, made root",
                            parent, codes[start].code_id
                        ),
                    },
                    FailurePolicy::Degrade,
                );
                break;
            }
            if !seen.insert(current) {
                break;
            }
            cursor = codes[current]
                .parent_code_id
                .as_ref()
                .and_then(|parent| positions.get(parent).copied());
        }
    }
}

/// Fills `child_codes` from each code's declared parent.
///
/// Parents missing from the batch leave the child as an orphan.
fn link_child_codes(codes: &mut [Code]) {
    let positions: HashMap<String, usize> = codes
        .iter()
        .enumerate()
        .map(|(i, code)| (code.code_id.clone(), i))
        .collect();

    let links: Vec<(usize, String)> = codes
        .iter()
        .filter_map(|code| {
            let parent = code.parent_code_id.as_ref()?;
            match positions.get(parent) {
                Some(&position) => Some((position, code.code_id.clone())),
                None => {
                    tracing::debug!(code_id = %code.code_id, parent = %parent, "Orphaned code, parent not in batch");
                    None
                }
            }
        })
        .collect();

    for (parent, child) in links {
        if !codes[parent].child_codes.contains(&child) {
            codes[parent].child_codes.push(child);
        }
    }
}

fn items<'a>(simple: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    simple
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn object(raw: &Value) -> Converted<&Map<String, Value>> {
    raw.as_object().ok_or_else(|| format!("expected an object, found {raw}"))
}

fn non_blank(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_text(obj: &Map<String, Value>, key: &str) -> Converted<String> {
    non_blank(obj, key).ok_or_else(|| format!("missing or empty {key}"))
}

fn optional_text(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn text_or(simple: &Map<String, Value>, key: &str, default: &str) -> String {
    match simple.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => default.to_string(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Reads a non-negative count; `None` means the value is present but unusable.
fn count(value: Option<&Value>, default: u32) -> Option<u32> {
    match value {
        None | Some(Value::Null) => Some(default),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    }
}
