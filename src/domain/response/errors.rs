//! Top-level response failures.

use thiserror::Error;

/// How much of the offending text is kept in a parse error.
const SNIPPET_CHARS: usize = 200;

/// A response that cannot be turned into a usable object at all.
///
/// Per-item problems inside an otherwise valid response are not errors;
/// they are absorbed by the transformer and counted in its report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// The provider returned nothing.
    #[error("response was empty")]
    Empty,

    /// The text is not valid JSON, even after repair.
    #[error("failed to parse response as JSON: {message}")]
    Parse {
        /// Parser error message.
        message: String,
        /// Leading part of the text that failed.
        snippet: String,
    },

    /// The JSON parsed but is not an object.
    #[error("unexpected response shape: expected an object, found {found}")]
    UnexpectedShape {
        /// Short description of what was found.
        found: String,
    },
}

impl ResponseError {
    /// Creates a parse error keeping a bounded snippet of the input.
    pub fn parse(message: impl Into<String>, text: &str) -> Self {
        Self::Parse {
            message: message.into(),
            snippet: text.chars().take(SNIPPET_CHARS).collect(),
        }
    }

    /// Creates a shape error.
    pub fn unexpected_shape(found: impl Into<String>) -> Self {
        Self::UnexpectedShape { found: found.into() }
    }
}
