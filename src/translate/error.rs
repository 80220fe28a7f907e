//! Translation failure taxonomy

use thiserror::Error;

/// Broad category of a failed translation, used for the result heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Config,
    Network,
    Api,
    Parse,
    Encode,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Config => write!(f, "Configuration error"),
            FailureKind::Network => write!(f, "Network error"),
            FailureKind::Api => write!(f, "API error"),
            FailureKind::Parse => write!(f, "Unexpected response"),
            FailureKind::Encode => write!(f, "Image encoding error"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("{0}")]
    Config(String),

    #[error("Request failed: {0}")]
    Network(String),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Could not find translated text in response: {0}")]
    Parse(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

impl TranslationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TranslationError::Config(_) => FailureKind::Config,
            TranslationError::Network(_) => FailureKind::Network,
            TranslationError::Api { .. } => FailureKind::Api,
            TranslationError::Parse(_) => FailureKind::Parse,
            TranslationError::Encode(_) => FailureKind::Encode,
        }
    }
}

/// Outcome of one translation request
pub type TranslationResult = Result<String, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_status_and_body() {
        let err = TranslationError::Api {
            status: 500,
            body: "internal".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API request failed with status 500: internal"
        );
        assert_eq!(err.kind(), FailureKind::Api);
    }

    #[test]
    fn test_kinds_are_distinct() {
        let errors = [
            TranslationError::Config("missing".into()),
            TranslationError::Network("timeout".into()),
            TranslationError::Parse("{}".into()),
            TranslationError::Encode("png".into()),
        ];
        let kinds: Vec<FailureKind> = errors.iter().map(TranslationError::kind).collect();
        assert_eq!(
            kinds,
            vec![
                FailureKind::Config,
                FailureKind::Network,
                FailureKind::Parse,
                FailureKind::Encode
            ]
        );
    }
}
