//! JSON export of a full analysis.

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::write_atomic;
use crate::domain::coding::{FullAnalysis, QuoteEvidence};
use crate::domain::response::TransformReport;
use crate::ports::{AnalysisExporter, ExportError};

pub const JSON_FILE_NAME: &str = "analysis.json";
pub const QUOTE_INVENTORY_FILE_NAME: &str = "quote_inventory.json";

#[derive(Serialize)]
struct AnalysisDocument<'a> {
    analysis: &'a FullAnalysis,
    transform_report: &'a TransformReport,
}

/// Writes the analysis graph, nesting preserved, as pretty JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonReportExporter;

impl JsonReportExporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AnalysisExporter for JsonReportExporter {
    async fn export(
        &self,
        analysis: &FullAnalysis,
        report: &TransformReport,
        output_dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let document = AnalysisDocument {
            analysis,
            transform_report: report,
        };
        let content = serde_json::to_string_pretty(&document)
            .map_err(|e| ExportError::Serialization(e.to_string()))?;

        let path = output_dir.join(JSON_FILE_NAME);
        write_atomic(&path, &content).await?;
        tracing::info!(path = %path.display(), "Wrote JSON analysis");
        Ok(path)
    }

    fn format_name(&self) -> &'static str {
        "json"
    }
}

/// Writes quotes gathered by per-theme extraction as a JSON array.
pub async fn write_quote_inventory(
    quotes: &[QuoteEvidence],
    output_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let content = serde_json::to_string_pretty(quotes)
        .map_err(|e| ExportError::Serialization(e.to_string()))?;

    let path = output_dir.join(QUOTE_INVENTORY_FILE_NAME);
    write_atomic(&path, &content).await?;
    tracing::info!(path = %path.display(), quotes = quotes.len(), "Wrote quote inventory");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coding::AnalysisMetadata;
    use crate::domain::response::transform_to_full_schema;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[tokio::test]
    async fn writes_analysis_and_report() {
        let temp_dir = TempDir::new().unwrap();
        let simple = json!({"themes": [{"theme_id": "T001", "name": "Trust"}]});
        let (analysis, report) =
            transform_to_full_schema(simple.as_object().unwrap(), AnalysisMetadata::default());

        let path = JsonReportExporter::new()
            .export(&analysis, &report, temp_dir.path())
            .await
            .unwrap();

        assert_eq!(path, temp_dir.path().join(JSON_FILE_NAME));
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["analysis"]["themes"][0]["name"], "Trust");
        assert!(written["transform_report"]["dropped"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_quote_inventory_array() {
        let temp_dir = TempDir::new().unwrap();
        let quotes = vec![crate::domain::response::parse_quote(
            "Ann (Interview 3): it just works",
            "T001_EQ01",
            "Trust",
        )];

        let path = write_quote_inventory(&quotes, temp_dir.path()).await.unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.as_array().unwrap().len(), 1);
        assert_eq!(written[0]["interview_id"], "INT_003");
    }
}
