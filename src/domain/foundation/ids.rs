//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Interview id used whenever a quote cannot be attributed.
pub const DEFAULT_INTERVIEW_ID: &str = "INT_001";

/// Unique identifier for a single analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Creates a new random RunId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier of an interview transcript, canonically `INT_` plus a
/// zero-padded sequence number (`INT_007`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterviewId(String);

impl InterviewId {
    /// Creates an InterviewId, rejecting blank values.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("interview_id"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Builds the canonical id for a sequence number: 7 -> `INT_007`.
    pub fn from_number(number: u32) -> Self {
        Self(format!("INT_{:03}", number))
    }

    /// Parses the canonical form strictly (`INT_` followed by digits).
    pub fn parse_canonical(s: &str) -> Result<Self, ValidationError> {
        let number = s
            .trim()
            .strip_prefix("INT_")
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(|| ValidationError::invalid_format("interview_id", "expected INT_NNN"))?;
        Ok(Self::from_number(number))
    }

    /// Returns the trailing sequence number, if the id has one.
    ///
    /// Splits on underscore and parses the last segment, so `INT_045`
    /// yields 45 and `interview` yields `None`.
    pub fn number(&self) -> Option<u32> {
        self.0.rsplit('_').next().and_then(|n| n.trim().parse().ok())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InterviewId {
    fn default() -> Self {
        Self(DEFAULT_INTERVIEW_ID.to_string())
    }
}

impl fmt::Display for InterviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InterviewId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
