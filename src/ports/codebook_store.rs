//! CodebookStore port for persisting the evolving codebook.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::codebook::EvolvingCodebook;

/// Errors that can occur while loading or saving the codebook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Corrupt codebook: {0}")]
    Corrupt(String),
}

/// Load-modify-save storage for the codebook.
///
/// Implementations are single-writer: two concurrent load/save cycles can
/// lose updates.
#[async_trait]
pub trait CodebookStore: Send + Sync {
    /// Loads the codebook, returning an empty one if none was saved yet.
    async fn load(&self) -> Result<EvolvingCodebook, StorageError>;

    /// Replaces the stored codebook.
    async fn save(&self, codebook: &EvolvingCodebook) -> Result<(), StorageError>;
}
