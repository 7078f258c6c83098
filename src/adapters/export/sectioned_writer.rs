//! Writes a plain-text report as one file per section.

use std::path::{Path, PathBuf};

use super::write_atomic;
use crate::domain::response::SectionedReport;
use crate::ports::ExportError;

/// Writes every non-empty section into `output_dir` and returns the paths.
pub async fn write_sectioned_report(
    report: &SectionedReport,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    let mut written = Vec::new();
    for (file_name, body) in report.output_files() {
        let path = output_dir.join(file_name);
        write_atomic(&path, &body).await?;
        written.push(path);
    }
    tracing::info!(files = written.len(), dir = %output_dir.display(), "Wrote sectioned report");
    Ok(written)
}
