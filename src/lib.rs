//! Grounded Coder - LLM-assisted qualitative coding of interview transcripts
//!
//! This crate turns loosely structured LLM output into a consistent grounded
//! theory analysis: themes, hierarchical codes, attributed quotes, quote
//! chains, contradictions, stakeholder positions and saturation.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
