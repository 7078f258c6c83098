//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `llm` - Gemini HTTP provider, retry decorator and test mock
//! - `codebook` - Filesystem storage for the evolving codebook
//! - `export` - JSON, Markdown and per-section file exporters

pub mod codebook;
pub mod export;
pub mod llm;

pub use codebook::FsCodebookStore;
pub use export::{
    write_quote_inventory, write_sectioned_report, JsonReportExporter, MarkdownReportExporter,
};
pub use llm::{GeminiConfig, GeminiProvider, MockLlmProvider, RetryPolicy, RetryingLlmProvider};
