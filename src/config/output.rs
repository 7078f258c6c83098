//! Output location configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Where exports and the evolving codebook are written
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_codebook_path")]
    pub codebook_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            codebook_path: default_codebook_path(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_codebook_path() -> PathBuf {
    PathBuf::from("output/evolving_codebook.json")
}
