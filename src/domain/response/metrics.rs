//! Numeric metric extraction from unstructured text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `key: value`, `key = value` and `key - value`, one per line.
static METRIC_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(?m)^[\s\-*]*([A-Za-z][A-Za-z0-9_ ]*?)\s*:\s*([^\s,;]+)")
            .expect("colon metric regex is valid"),
        Regex::new(r"(?m)^[\s\-*]*([A-Za-z][A-Za-z0-9_ ]*?)\s*=\s*([^\s,;]+)")
            .expect("equals metric regex is valid"),
        Regex::new(r"(?m)^[\s\-*]*([A-Za-z][A-Za-z0-9_ ]*?)\s+-\s+([^\s,;]+)")
            .expect("dash metric regex is valid"),
    ]
});

/// Extracts `key -> number` pairs from free text.
///
/// Patterns are applied in sequence over the whole text; a later match for
/// the same key overwrites an earlier one. Keys are lower-cased. Values
/// that do not parse as numbers are skipped.
pub fn extract_metrics(text: &str) -> BTreeMap<String, f64> {
    let mut metrics = BTreeMap::new();

    for pattern in METRIC_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let key = key.as_str().trim().to_lowercase();
            match value.as_str().parse::<f64>() {
                Ok(number) if number.is_finite() => {
                    metrics.insert(key, number);
                }
                _ => {
                    tracing::debug!(metric = %key, value = value.as_str(), "Skipping non-numeric metric");
                }
            }
        }
    }

    metrics
}

/// Quality metrics reported alongside a plain-text analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub traceability_completeness: Option<f64>,
    pub quote_attribution_rate: Option<f64>,
    pub evidence_strength: Option<f64>,
    pub theme_coverage: Option<f64>,
    pub saturation_confidence: Option<f64>,
    /// Everything the extractor found that is not a recognized metric.
    pub other: BTreeMap<String, f64>,
}

impl QualityMetrics {
    /// Sorts extracted metrics into recognized fields and the rest.
    pub fn from_map(mut metrics: BTreeMap<String, f64>) -> Self {
        Self {
            traceability_completeness: metrics.remove("traceability_completeness"),
            quote_attribution_rate: metrics.remove("quote_attribution_rate"),
            evidence_strength: metrics.remove("evidence_strength"),
            theme_coverage: metrics.remove("theme_coverage"),
            saturation_confidence: metrics.remove("saturation_confidence"),
            other: metrics,
        }
    }
}
