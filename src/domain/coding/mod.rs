//! Coding Module - The validated qualitative-analysis object graph.
//!
//! These are the strongly-typed entities produced once an LLM response has
//! been repaired, fixed and transformed. Export and storage collaborators
//! consume only these types, never the raw payload.
//!
//! # Components
//!
//! - `Theme` / `Code` - Grounded-theory themes and their (hierarchical) codes
//! - `QuoteEvidence` / `QuoteChain` - Attributed quotes and ordered chains of them
//! - `ContradictionPair` / `StakeholderPosition` - Structured opinions
//! - `SaturationAssessment` - Where theoretical saturation was reached
//! - `FullAnalysis` - The complete result with derived cross-reference indices
//! - `InterviewTranscript` - Input text plus metadata

mod analysis;
mod code;
mod interview;
mod opinion;
mod quote;
mod saturation;
mod theme;

pub use analysis::{AnalysisMetadata, FullAnalysis};
pub use code::Code;
pub use interview::{InterviewMetadata, InterviewTranscript};
pub use opinion::{ContradictionPair, StakeholderPosition};
pub use quote::{ChainType, QuoteChain, QuoteEvidence};
pub use saturation::SaturationAssessment;
pub use theme::Theme;
