//! Property tests for response repair, parsing and transformation.
//!
//! These exercise the pure response pipeline with generated input:
//! 1. Repair never corrupts well-formed JSON
//! 2. Section parsing always yields every canonical section
//! 3. Prevalence always lands in [0, 1]
//! 4. Chain types always normalize to a canonical value
//! 5. Broken themes are degraded while broken chains are dropped

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use grounded_coder::domain::coding::{AnalysisMetadata, ChainType};
use grounded_coder::domain::response::{
    extract_metrics, fix_response_data, normalize_prevalence, parse_quote, parse_sections, repair,
    transform_to_full_schema, ItemKind, SectionName, SectionedReport,
};

// =============================================================================
// Strategies
// =============================================================================

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "\\PC{0,20}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn theme(index: usize) -> Value {
    json!({"theme_id": format!("T{:03}", index + 1), "name": format!("Theme {}", index + 1)})
}

fn chain(index: usize) -> Value {
    json!({
        "chain_id": format!("QC{:03}", index + 1),
        "theme_id": "T001",
        "chain_type": "evolution",
        "quotes": ["Interview 1: first", "Interview 2: second"]
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn repair_preserves_valid_json(value in arb_json()) {
        for text in [serde_json::to_string(&value).unwrap(), serde_json::to_string_pretty(&value).unwrap()] {
            let repaired = repair(&text);
            let reparsed: Value = serde_json::from_str(&repaired).unwrap();
            prop_assert_eq!(&reparsed, &value);
        }
    }

    #[test]
    fn sections_always_cover_canonical_names(text in "(\\PC{0,40}\n?){0,10}") {
        let sections = parse_sections(&text);
        prop_assert_eq!(sections.len(), SectionName::ALL.len());
        for name in SectionName::ALL {
            prop_assert!(sections.iter().any(|(found, _)| found == name));
            // Content is trimmed, so "present" never means whitespace only.
            let content = sections.get(name);
            prop_assert!(content.is_empty() || !content.trim().is_empty());
        }
    }

    #[test]
    fn text_prevalence_is_a_share(text in "\\PC{0,60}") {
        let share = normalize_prevalence(&json!(text));
        prop_assert!((0.0..=1.0).contains(&share), "{} -> {}", text, share);
    }

    #[test]
    fn numeric_prevalence_is_a_share(n in -1.0e6f64..1.0e6) {
        let share = normalize_prevalence(&json!(n));
        prop_assert!((0.0..=1.0).contains(&share), "{} -> {}", n, share);
    }

    #[test]
    fn fixed_themes_carry_shares(prevalence in prop_oneof![
        "\\PC{0,40}".prop_map(Value::String),
        (-500i64..500).prop_map(|n| json!(n)),
        Just(Value::Null),
    ]) {
        let fixed = fix_response_data(object(json!({"themes": [{"name": "X", "prevalence": prevalence}]})));
        let share = fixed["themes"][0]["prevalence"].as_f64().unwrap();
        prop_assert!((0.0..=1.0).contains(&share));
    }

    #[test]
    fn chain_types_are_closed(raw in "\\PC{0,30}") {
        let simple = object(json!({
            "quote_chains": [{"theme_id": "T001", "chain_type": raw, "quotes": []}]
        }));
        let (analysis, _) = transform_to_full_schema(&simple, AnalysisMetadata::default());
        prop_assert_eq!(analysis.quote_chains.len(), 1);
        prop_assert!(ChainType::ALL.contains(&analysis.quote_chains[0].chain_type));
    }

    #[test]
    fn broken_theme_is_degraded_and_broken_chain_dropped(
        n in 1usize..8,
        broken_seed in any::<prop::sample::Index>(),
    ) {
        let broken = broken_seed.index(n);

        let themes: Vec<Value> = (0..n)
            .map(|i| if i == broken { json!({"theme_id": "", "name": ""}) } else { theme(i) })
            .collect();
        let chains: Vec<Value> = (0..n)
            .map(|i| if i == broken { json!({"chain_id": "BROKEN", "quotes": "not a list"}) } else { chain(i) })
            .collect();

        let simple = object(json!({"themes": themes, "quote_chains": chains}));
        let (analysis, report) = transform_to_full_schema(&simple, AnalysisMetadata::default());

        prop_assert_eq!(analysis.themes.len(), n);
        prop_assert_eq!(analysis.quote_chains.len(), n - 1);
        prop_assert_eq!(&analysis.themes[broken].theme_id, &format!("T{:03}", broken + 1));
        prop_assert!(!analysis.themes[broken].name.is_empty());
        prop_assert!(analysis.quote_chains.iter().all(|c| c.chain_id != "BROKEN"));
        prop_assert_eq!(report.failures_for(ItemKind::Theme), 1);
        prop_assert_eq!(report.failures_for(ItemKind::QuoteChain), 1);

        // Surviving chains keep input order.
        let ids: Vec<&str> = analysis.quote_chains.iter().map(|c| c.chain_id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        prop_assert_eq!(ids, sorted);
    }

    #[test]
    fn attributed_quotes_zero_pad_interview(number in 1u32..1000, speaker in "[A-Z][a-z]{1,10}") {
        let raw = format!("{} (Interview {}): it helps", speaker, number);
        let quote = parse_quote(&raw, "Q1", "ctx");
        prop_assert_eq!(quote.interview_id.as_str(), format!("INT_{:03}", number));
        prop_assert_eq!(quote.text, format!("{}: it helps", speaker));
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn prevalence_examples() {
    assert_eq!(normalize_prevalence(&json!("universal")), 1.0);
    let ratio = normalize_prevalence(&json!("mentioned in 15 of 18 interviews"));
    assert!((ratio - 15.0 / 18.0).abs() < 1e-9);
    assert_eq!(normalize_prevalence(&json!("50%")), 0.5);
    assert_eq!(normalize_prevalence(&json!("unclear")), 0.5);
}

#[test]
fn quote_attribution_example() {
    let quote = parse_quote("Dr. Smith (Interview 007): AI helps with coding", "Q1", "T001");
    assert_eq!(quote.interview_id.as_str(), "INT_007");
    assert!(quote.text.contains("Dr. Smith: AI helps with coding"));
}

#[test]
fn sections_and_metrics_end_to_end() {
    let text = "=== THEMES_CSV ===\ntheme_id,name\nT001,Trust\n\n=== METRICS ===\n\
                traceability_completeness: 0.9\nevidence_strength = 0.85\n";

    let sections = parse_sections(text);
    let metrics = extract_metrics(sections.get(SectionName::Metrics));

    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics["traceability_completeness"], 0.9);
    assert_eq!(metrics["evidence_strength"], 0.85);

    let empty = SectionName::ALL
        .iter()
        .filter(|name| sections.get(**name).is_empty())
        .count();
    assert_eq!(empty, 11);

    let report = SectionedReport::from_text(text);
    assert_eq!(report.metrics.traceability_completeness, Some(0.9));
    assert_eq!(report.metrics.evidence_strength, Some(0.85));
    assert_eq!(report.output_files().len(), 2);
}
