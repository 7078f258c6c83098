//! Filesystem storage adapter for the evolving codebook

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::codebook::EvolvingCodebook;
use crate::ports::{CodebookStore, StorageError};

/// Stores the codebook as pretty-printed JSON at a single path.
///
/// Saves go through a temporary file and a rename, so a crash never leaves
/// a half-written codebook. Concurrent writers are not coordinated.
pub struct FsCodebookStore {
    path: PathBuf,
}

impl FsCodebookStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists
    async fn ensure_dir_exists(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("Failed to create directory", e))?;
        }
        Ok(())
    }
}

fn io_error(context: &str, e: std::io::Error) -> StorageError {
    if e.kind() == ErrorKind::PermissionDenied {
        StorageError::PermissionDenied(format!("{}: {}", context, e))
    } else {
        StorageError::IoError(format!("{}: {}", context, e))
    }
}

#[async_trait]
impl CodebookStore for FsCodebookStore {
    async fn load(&self) -> Result<EvolvingCodebook, StorageError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No codebook yet, starting empty");
                return Ok(EvolvingCodebook::new());
            }
            Err(e) => return Err(io_error("Failed to read codebook", e)),
        };

        if content.trim().is_empty() {
            return Ok(EvolvingCodebook::new());
        }

        serde_json::from_str(&content).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    async fn save(&self, codebook: &EvolvingCodebook) -> Result<(), StorageError> {
        self.ensure_dir_exists().await?;

        let content = serde_json::to_string_pretty(codebook)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;

        // Write atomically using a temporary file
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content)
            .await
            .map_err(|e| io_error("Failed to write temporary file", e))?;

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                tracing::warn!(path = %temp_path.display(), error = %cleanup, "Failed to remove temporary file");
            }
            return Err(io_error("Failed to rename file", e));
        }

        tracing::debug!(path = %self.path.display(), "Saved codebook");
        Ok(())
    }
}
