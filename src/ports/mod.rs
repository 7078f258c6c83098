//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `LlmProvider` - Text generation (HTTP provider, retry decorator, mock)
//! - `CodebookStore` - Persistence of the evolving codebook
//! - `AnalysisExporter` - Writing finished analyses

mod codebook_store;
mod exporter;
mod llm_provider;

pub use codebook_store::{CodebookStore, StorageError};
pub use exporter::{AnalysisExporter, ExportError};
pub use llm_provider::{GenerationConfig, LlmError, LlmProvider, ProviderInfo, ResponseMimeType};
