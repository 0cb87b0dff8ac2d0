//! Error types for the CREC refinement core

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that end processing of a single document.
///
/// Entity-level problems (a span trimmed to nothing, a blacklisted name) are
/// not errors: those entities are simply dropped.
#[derive(Error, Debug)]
pub enum Error {
    /// The raw text has no run of uppercase/punctuation characters marking the
    /// start of the record body
    #[error("no content-bearing region found in document")]
    NoContentFound,

    /// The annotation handed to the refiner is unusable
    #[error("invalid annotation: {0}")]
    Annotation(String),

    /// Refiner configuration could not be parsed
    #[error("invalid refiner configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Whether the failure is tied to the document itself rather than to the
    /// setup of the run. Callers usually skip such documents and carry on.
    pub fn is_document_level(&self) -> bool {
        matches!(self, Error::NoContentFound | Error::Annotation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_level_errors() {
        assert!(Error::NoContentFound.is_document_level());
        assert!(Error::Annotation("bad range".into()).is_document_level());

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!Error::Config(parse).is_document_level());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::NoContentFound.to_string(),
            "no content-bearing region found in document"
        );
        assert_eq!(
            Error::Annotation("entity 3 out of range".into()).to_string(),
            "invalid annotation: entity 3 out of range"
        );
    }
}
