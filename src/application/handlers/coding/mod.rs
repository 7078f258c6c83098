//! Interview coding handlers.

mod analyze_interviews;
mod errors;
mod extract_quotes;
mod generate_report;

pub use analyze_interviews::{
    AnalysisOutcome, AnalysisSettings, AnalyzeInterviewsCommand, AnalyzeInterviewsHandler,
};
pub use errors::AnalyzeError;
pub use extract_quotes::QuoteExtractor;
pub use generate_report::{GenerateSectionedReportCommand, GenerateSectionedReportHandler};
