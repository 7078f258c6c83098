//! Codebook storage adapters.

mod filesystem;

pub use filesystem::FsCodebookStore;
