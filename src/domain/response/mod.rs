//! Response Module - Turning unreliable LLM output into the analysis model.
//!
//! Everything here is synchronous and free of I/O so it can be tested in
//! isolation. The flow is:
//!
//! ```text
//! RawLlmResponse ──► repair / sections ──► JSON object ──► fix_response_data
//!                                                               │
//!                                  FullAnalysis ◄── transform_to_full_schema
//! ```
//!
//! # Components
//!
//! - `repair` - Best-effort syntactic repair of JSON-like text
//! - `parse_sections` / `ParsedSections` - Header-delimited plain-text reports
//! - `extract_metrics` / `QualityMetrics` - `key: value` metric lines
//! - `parse_quote` - Speaker and interview attribution of quote strings
//! - `fix_response_data` - Default filling and prevalence normalization
//! - `transform_to_full_schema` - Item-wise conversion with degrade/drop policy
//! - `SectionedReport` - A decoded plain-text report

mod attribution;
mod errors;
mod fixer;
mod metrics;
mod raw;
mod repair;
mod sectioned_report;
mod sections;
mod transformer;

pub use attribution::parse_quote;
pub use errors::ResponseError;
pub use fixer::{
    fix_response_data, normalize_prevalence, normalize_score, DEFAULT_CONFIDENCE,
    DEFAULT_PREVALENCE, DEFAULT_SATURATION_POINT,
};
pub use metrics::{extract_metrics, QualityMetrics};
pub use raw::{extract_json_candidate, parse_json_lenient, RawLlmResponse};
pub use repair::repair;
pub use sectioned_report::{file_name as section_file_name, SectionedReport};
pub use sections::{normalize_header, parse_sections, ParsedSections, SectionName};
pub use transformer::{
    transform_to_full_schema, FailurePolicy, ItemError, ItemKind, TransformReport,
};
