use thiserror::Error;

// Failure taxonomy for the analysis pipeline. Used to pick the
// user-facing message on the fallback path, not for control flow -
// the client always gets a structurally valid WineAnalysis back.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("upstream rejected credentials")]
    Authentication,

    #[error("upstream rate limit hit")]
    RateLimited,

    #[error("upstream quota exhausted")]
    QuotaExceeded,

    #[error("model reply contained no JSON object")]
    NoStructuredContent,

    #[error("model reply contained malformed JSON")]
    MalformedJson,

    #[error("analysis failed: {0}")]
    Unknown(String),
}

impl AnalysisError {
    // Human-readable fragment placed into the fallback analysis
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Authentication => {
                "The analysis service is not configured correctly. Please try again later."
            }
            Self::RateLimited => {
                "The analysis service is busy right now. Please try again in a minute."
            }
            Self::QuotaExceeded => {
                "The analysis service has reached its usage limit for now."
            }
            Self::NoStructuredContent => {
                "The label could not be read into a structured analysis."
            }
            Self::MalformedJson => {
                "The analysis came back garbled and could not be used."
            }
            Self::Unknown(_) => "Something went wrong while analyzing this label.",
        }
    }

    // Map an upstream HTTP status onto the taxonomy
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Authentication,
            429 => Self::RateLimited,
            402 => Self::QuotaExceeded,
            code => Self::Unknown(format!("upstream returned status {}", code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(
            AnalysisError::from_status(reqwest::StatusCode::UNAUTHORIZED),
            AnalysisError::Authentication
        );
        assert_eq!(
            AnalysisError::from_status(reqwest::StatusCode::FORBIDDEN),
            AnalysisError::Authentication
        );
        assert_eq!(
            AnalysisError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS),
            AnalysisError::RateLimited
        );
        assert_eq!(
            AnalysisError::from_status(reqwest::StatusCode::PAYMENT_REQUIRED),
            AnalysisError::QuotaExceeded
        );
        assert!(matches!(
            AnalysisError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            AnalysisError::Unknown(_)
        ));
    }

    #[test]
    fn every_kind_has_a_distinct_message() {
        let kinds = [
            AnalysisError::Authentication,
            AnalysisError::RateLimited,
            AnalysisError::QuotaExceeded,
            AnalysisError::NoStructuredContent,
            AnalysisError::MalformedJson,
            AnalysisError::Unknown("x".to_string()),
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a.user_message(), b.user_message());
            }
        }
    }
}
