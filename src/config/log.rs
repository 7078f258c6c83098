//! Logging configuration

use serde::Deserialize;

use super::error::ValidationError;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Log output settings. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,

    #[serde(default = "default_level")]
    pub level: String,
}

impl LogConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidLogLevel(self.level.clone()));
        }
        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
