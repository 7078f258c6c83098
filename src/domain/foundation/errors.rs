//! Validation errors for domain value objects.

use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_names_the_field() {
        let err = ValidationError::empty_field("interview_id");
        assert_eq!(format!("{}", err), "Field 'interview_id' cannot be empty");
    }

    #[test]
    fn invalid_format_includes_reason() {
        let err = ValidationError::invalid_format("interview_id", "expected INT_NNN");
        assert_eq!(
            format!("{}", err),
            "Field 'interview_id' has invalid format: expected INT_NNN"
        );
    }
}
