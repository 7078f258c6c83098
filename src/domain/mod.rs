//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `coding` - Themes, codes, quotes and the full analysis graph
//! - `response` - Repair, parsing and transformation of LLM responses
//! - `codebook` - The evolving codebook accumulated across runs

pub mod codebook;
pub mod coding;
pub mod foundation;
pub mod response;
