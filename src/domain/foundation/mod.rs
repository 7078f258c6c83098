//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps and validation errors that form the
//! vocabulary of the coding pipeline.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{InterviewId, RunId, DEFAULT_INTERVIEW_ID};
pub use timestamp::Timestamp;
