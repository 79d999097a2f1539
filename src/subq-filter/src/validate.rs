//! Structural validation of filter trees
//!
//! Validation never touches row data. It checks that every leaf targets a
//! known column, that the leaf's operator is legal for that column's type,
//! and that the tree stays within [`MAX_FILTER_DEPTH`]. The arity of `not`
//! is carried by the type itself: a [`FilterNode::Not`] always owns exactly
//! one operand, and wire input with any other shape fails to decode.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use subq_shared::constants::MAX_FILTER_DEPTH;

use crate::ast::FilterNode;
use crate::column::{ColumnType, OperatorRegistry};
use crate::error::{ValidationError, ValidationReason};

/// Lookup of a column's declared type
pub trait ColumnTypes {
    /// Type of `column`, or `None` if the dataset has no such column
    fn column_type(&self, column: &str) -> Option<ColumnType>;
}

impl<F> ColumnTypes for F
where
    F: Fn(&str) -> Option<ColumnType>,
{
    fn column_type(&self, column: &str) -> Option<ColumnType> {
        self(column)
    }
}

/// Ordered mapping of dataset columns to their types
///
/// Serialized as a plain JSON object, e.g. `{"rating": "continuous"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: IndexMap<String, ColumnType>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or retype a column
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.insert(name.into(), column_type);
        self
    }

    /// Columns of a given type, in declaration order
    pub fn columns_of_type(&self, column_type: ColumnType) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, ty)| **ty == column_type)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema declares no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate over columns and their types
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.columns.iter().map(|(name, ty)| (name.as_str(), *ty))
    }
}

impl ColumnTypes for Schema {
    fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.columns.get(column).copied()
    }
}

impl<S: Into<String>> FromIterator<(S, ColumnType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (S, ColumnType)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        }
    }
}

/// Validate a tree against the built-in operator table
pub fn validate<C>(node: &FilterNode, columns: &C) -> Result<(), ValidationError>
where
    C: ColumnTypes + ?Sized,
{
    validate_with(node, columns, &OperatorRegistry::default())
}

/// Validate a tree against a custom operator table
pub fn validate_with<C>(
    node: &FilterNode,
    columns: &C,
    operators: &OperatorRegistry,
) -> Result<(), ValidationError>
where
    C: ColumnTypes + ?Sized,
{
    let validator = Validator { columns, operators };
    validator.walk(node, "$", 1)
}

struct Validator<'a, C: ?Sized> {
    columns: &'a C,
    operators: &'a OperatorRegistry,
}

impl<C: ColumnTypes + ?Sized> Validator<'_, C> {
    fn walk(&self, node: &FilterNode, path: &str, depth: usize) -> Result<(), ValidationError> {
        if depth > MAX_FILTER_DEPTH {
            return Err(ValidationError::new(
                path,
                ValidationReason::TooDeep {
                    max: MAX_FILTER_DEPTH,
                },
            ));
        }
        log::trace!("validating {path}");

        match node {
            FilterNode::And { operands } | FilterNode::Or { operands } => {
                for (i, operand) in operands.iter().enumerate() {
                    self.walk(operand, &format!("{path}.operands[{i}]"), depth + 1)?;
                }
                Ok(())
            }
            FilterNode::Not { operand } => {
                self.walk(operand, &format!("{path}.operand"), depth + 1)
            }
            leaf => self.check_leaf(leaf, path),
        }
    }

    fn check_leaf(&self, leaf: &FilterNode, path: &str) -> Result<(), ValidationError> {
        let (Some(target), Some(operator)) = (leaf.target(), leaf.operator()) else {
            return Ok(());
        };

        let column_type = self.columns.column_type(target).ok_or_else(|| {
            ValidationError::new(path, ValidationReason::UnknownColumn(target.to_string()))
        })?;

        if self.operators.permits(column_type, operator) {
            Ok(())
        } else {
            Err(ValidationError::new(
                path,
                ValidationReason::IllegalOperator {
                    operator,
                    column: target.to_string(),
                    column_type,
                },
            ))
        }
    }
}
