//! Export adapters.
//!
//! - `JsonReportExporter` - `analysis.json`
//! - `write_quote_inventory` - `quote_inventory.json`
//! - `MarkdownReportExporter` - `analysis_report.md`
//! - `write_sectioned_report` - one file per section of a plain-text report

mod json_exporter;
mod markdown_exporter;
mod sectioned_writer;

pub use json_exporter::{write_quote_inventory, JsonReportExporter};
pub use markdown_exporter::{render_markdown, MarkdownReportExporter};
pub use sectioned_writer::write_sectioned_report;

use std::path::Path;
use tokio::fs;

use crate::ports::ExportError;

/// Writes a file through a temporary sibling and a rename.
async fn write_atomic(path: &Path, content: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ExportError::Io(format!("Failed to create directory: {}", e)))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    fs::write(temp_path, content)
        .await
        .map_err(|e| ExportError::Io(format!("Failed to write temporary file: {}", e)))?;
    fs::rename(temp_path, path)
        .await
        .map_err(|e| ExportError::Io(format!("Failed to rename file: {}", e)))
}
