//! Theoretical saturation assessment.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::InterviewId;

/// Where new interviews stopped producing new codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaturationAssessment {
    /// Interview id as reported, e.g. `INT_045`.
    pub saturation_point: String,
    /// Sequence number parsed from the point.
    pub interview_number: Option<u32>,
    pub evidence: String,
}

impl SaturationAssessment {
    /// Builds an assessment, parsing the interview number from the point.
    ///
    /// When the point carries no trailing number the fallback is used
    /// (the number of interviews analyzed, if known).
    pub fn from_point(
        saturation_point: impl Into<String>,
        evidence: impl Into<String>,
        fallback_number: Option<u32>,
    ) -> Self {
        let saturation_point = saturation_point.into();
        let parsed = InterviewId::new(saturation_point.as_str())
            .ok()
            .and_then(|id| id.number());

        let interview_number = match parsed {
            Some(n) => Some(n),
            None => {
                tracing::warn!(
                    saturation_point = %saturation_point,
                    fallback = ?fallback_number,
                    "Could not parse saturation interview number"
                );
                fallback_number
            }
        };

        Self {
            saturation_point,
            interview_number,
            evidence: evidence.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trailing_number() {
        let s = SaturationAssessment::from_point("INT_045", "no new codes", Some(60));
        assert_eq!(s.interview_number, Some(45));
    }

    #[test]
    fn unparseable_point_uses_fallback() {
        let s = SaturationAssessment::from_point("Not reached", "", Some(18));
        assert_eq!(s.interview_number, Some(18));
    }

    #[test]
    fn unparseable_point_without_fallback_is_none() {
        let s = SaturationAssessment::from_point("", "", None);
        assert_eq!(s.interview_number, None);
    }
}
