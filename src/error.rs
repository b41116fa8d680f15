//! Error types for the jobsweep engine

use thiserror::Error;

/// Main error type for jobsweep operations
#[derive(Error, Debug)]
pub enum JobsweepError {
    /// A sweep was requested against a page that does not belong to the target job site
    #[error("current page is not the target job site")]
    NotOnTargetSite,

    /// An expected piece of page structure was absent
    #[error("missing page element: {what}")]
    MissingElement {
        /// Description of the element that could not be found
        what: String,
    },

    /// Caller supplied an argument outside the accepted range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing key-value store failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Pattern compilation failed
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Persisted state could not be serialized or deserialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying I/O failure from the file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for jobsweep operations
pub type Result<T> = std::result::Result<T, JobsweepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = JobsweepError::MissingElement {
            what: "company name".to_string(),
        };
        assert_eq!(err.to_string(), "missing page element: company name");

        let err = JobsweepError::InvalidArgument("increment must be positive".to_string());
        assert!(err.to_string().contains("increment must be positive"));
    }

    #[test]
    fn test_regex_error_conversion() {
        let bad = regex::Regex::new("(unclosed");
        let err: JobsweepError = bad.unwrap_err().into();
        assert!(matches!(err, JobsweepError::Regex(_)));
    }
}
