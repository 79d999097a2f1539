//! Error types for subdataset operations
//!
//! Every error here is raised before the registry changes: operations build
//! a new registry value and only hand it back on success.

use subq_filter::ValidationError;

/// Result type alias for subdataset operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by registry, set-algebra and enumeration operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The name is already used by another subdataset
    #[error("A subdataset named '{0}' already exists")]
    DuplicateName(String),

    /// Subdataset names must be non-empty
    #[error("Subdataset names must not be empty")]
    EmptyName,

    /// Merging needs at least two subdatasets
    #[error("Merging requires at least 2 subdatasets, got {found}")]
    InsufficientOperands {
        /// Number of subdatasets supplied
        found: usize,
    },

    /// Tag-grouped topic enumeration was requested without any tag
    #[error("At least one grouper tag must be selected")]
    NoGrouperTags,

    /// The named subdataset is not in the registry
    #[error("No subdataset named '{0}'")]
    UnknownSubdataset(String),

    /// A filter tree failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::DuplicateName("A".to_string()).to_string(),
            "A subdataset named 'A' already exists"
        );
        assert_eq!(
            Error::InsufficientOperands { found: 1 }.to_string(),
            "Merging requires at least 2 subdatasets, got 1"
        );
        assert_eq!(
            Error::NoGrouperTags.to_string(),
            "At least one grouper tag must be selected"
        );
    }

    #[test]
    fn test_validation_conversion() {
        let err: Error = ValidationError::malformed("bad").into();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.to_string(), "Invalid filter at $: malformed filter: bad");
    }
}
