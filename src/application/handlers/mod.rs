//! Application handlers.
//!
//! Command handlers that orchestrate domain operations through ports.

pub mod coding;

pub use coding::{
    AnalysisOutcome, AnalysisSettings, AnalyzeError, AnalyzeInterviewsCommand,
    AnalyzeInterviewsHandler, GenerateSectionedReportCommand, GenerateSectionedReportHandler,
    QuoteExtractor,
};
