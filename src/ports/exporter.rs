//! AnalysisExporter port for writing finished analyses.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::coding::FullAnalysis;
use crate::domain::response::TransformReport;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Writes an analysis into an output directory.
#[async_trait]
pub trait AnalysisExporter: Send + Sync {
    /// Writes the analysis and returns the path of the file produced.
    async fn export(
        &self,
        analysis: &FullAnalysis,
        report: &TransformReport,
        output_dir: &Path,
    ) -> Result<PathBuf, ExportError>;

    /// Short name for logs.
    fn format_name(&self) -> &'static str;
}
