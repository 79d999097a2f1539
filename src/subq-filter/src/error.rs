//! Error types for the filter model

use crate::column::{ColumnType, LeafOperator};

/// A filter tree that may not enter a registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid filter at {path}: {reason}")]
pub struct ValidationError {
    /// Location of the offending node, `$` being the root
    pub path: String,
    /// What is wrong with the node
    pub reason: ValidationReason,
}

impl ValidationError {
    /// Create a validation error at `path`
    pub fn new(path: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }

    /// Create a decoding error at the root
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::new("$", ValidationReason::Malformed(msg.into()))
    }
}

/// Reasons a filter tree is rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationReason {
    /// The leaf operator is not legal for the target's column type
    #[error("operator '{operator}' is not allowed on {column_type} column '{column}'")]
    IllegalOperator {
        /// Offending operator
        operator: LeafOperator,
        /// Target column
        column: String,
        /// Declared type of the target column
        column_type: ColumnType,
    },

    /// The leaf targets a column the dataset does not have
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// The tree nests deeper than the supported limit
    #[error("nesting exceeds {max} levels")]
    TooDeep {
        /// Maximum accepted depth
        max: usize,
    },

    /// The wire form could not be decoded into a filter tree
    #[error("malformed filter: {0}")]
    Malformed(String),
}

/// A column type name outside the registered set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown column type: {0}")]
pub struct UnknownColumnType(pub String);

/// A leaf operator name outside the registered set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown filter operator: {0}")]
pub struct UnknownOperator(pub String);
