//! Filter tree definitions
//!
//! A [`FilterNode`] is either a leaf predicate over one target column or a
//! boolean combinator over child nodes. The serde representation is the wire
//! contract: an object tagged by `type`, with `target`, `value`, `values`,
//! `operands` or `operand` depending on the kind.
//!
//! Construction never simplifies. `and`/`or` with no operands are kept as
//! written and mean "match everything" and "match nothing" respectively.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::column::LeafOperator;
use crate::error::ValidationError;
use crate::value::Scalar;

/// A node of a filter tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterNode {
    /// Target value is missing
    Empty {
        /// Column the predicate applies to
        target: String,
    },
    /// Target value is present
    NotEmpty {
        /// Column the predicate applies to
        target: String,
    },
    /// Target equals `value`
    EqualTo {
        /// Column the predicate applies to
        target: String,
        /// Literal to compare with
        value: Scalar,
    },
    /// Target equals one of `values`
    IsOneOf {
        /// Column the predicate applies to
        target: String,
        /// Accepted literals
        values: Vec<Scalar>,
    },
    /// Target is strictly greater than `value`
    GreaterThan {
        /// Column the predicate applies to
        target: String,
        /// Lower bound, exclusive
        value: Scalar,
    },
    /// Target is strictly less than `value`
    LessThan {
        /// Column the predicate applies to
        target: String,
        /// Upper bound, exclusive
        value: Scalar,
    },
    /// Target is greater than or equal to `value`
    GreaterThanOrEqualTo {
        /// Column the predicate applies to
        target: String,
        /// Lower bound, inclusive
        value: Scalar,
    },
    /// Target is less than or equal to `value`
    LessThanOrEqualTo {
        /// Column the predicate applies to
        target: String,
        /// Upper bound, inclusive
        value: Scalar,
    },
    /// Target text contains `value`
    HasText {
        /// Column the predicate applies to
        target: String,
        /// Fragment to look for
        value: String,
    },
    /// Target label set contains none of `values`
    Excludes {
        /// Column the predicate applies to
        target: String,
        /// Rejected labels
        values: Vec<Scalar>,
    },
    /// Target label set contains all of `values`
    Includes {
        /// Column the predicate applies to
        target: String,
        /// Required labels
        values: Vec<Scalar>,
    },
    /// Target label set is exactly `values`
    Only {
        /// Column the predicate applies to
        target: String,
        /// The complete label set
        values: Vec<Scalar>,
    },
    /// Target flag is set
    IsTrue {
        /// Column the predicate applies to
        target: String,
    },
    /// Every operand matches; no operands matches everything
    And {
        /// Conjuncts
        operands: Vec<FilterNode>,
    },
    /// Some operand matches; no operands matches nothing
    Or {
        /// Disjuncts
        operands: Vec<FilterNode>,
    },
    /// The operand does not match
    Not {
        /// Negated tree
        operand: Box<FilterNode>,
    },
}

impl FilterNode {
    /// Create an `equal_to` leaf
    pub fn equal_to(target: impl Into<String>, value: impl Into<Scalar>) -> Self {
        FilterNode::EqualTo {
            target: target.into(),
            value: value.into(),
        }
    }

    /// Create an `is_one_of` leaf
    pub fn is_one_of(target: impl Into<String>, values: Vec<Scalar>) -> Self {
        FilterNode::IsOneOf {
            target: target.into(),
            values,
        }
    }

    /// Create an `is_true` leaf
    pub fn is_true(target: impl Into<String>) -> Self {
        FilterNode::IsTrue {
            target: target.into(),
        }
    }

    /// Create a conjunction
    pub fn and(operands: Vec<FilterNode>) -> Self {
        FilterNode::And { operands }
    }

    /// Create a disjunction
    pub fn or(operands: Vec<FilterNode>) -> Self {
        FilterNode::Or { operands }
    }

    /// Wrap a tree in a negation
    pub fn not(operand: FilterNode) -> Self {
        FilterNode::Not {
            operand: Box::new(operand),
        }
    }

    /// The empty conjunction, matching every row
    pub fn match_all() -> Self {
        FilterNode::And {
            operands: Vec::new(),
        }
    }

    /// The empty disjunction, matching no row
    pub fn match_none() -> Self {
        FilterNode::Or {
            operands: Vec::new(),
        }
    }

    /// Whether the node is `and`, `or` or `not`
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            FilterNode::And { .. } | FilterNode::Or { .. } | FilterNode::Not { .. }
        )
    }

    /// Whether the node is a column predicate
    pub fn is_leaf(&self) -> bool {
        !self.is_compound()
    }

    /// Leaf operator of the node; `None` for compounds
    pub fn operator(&self) -> Option<LeafOperator> {
        let op = match self {
            FilterNode::Empty { .. } => LeafOperator::Empty,
            FilterNode::NotEmpty { .. } => LeafOperator::NotEmpty,
            FilterNode::EqualTo { .. } => LeafOperator::EqualTo,
            FilterNode::IsOneOf { .. } => LeafOperator::IsOneOf,
            FilterNode::GreaterThan { .. } => LeafOperator::GreaterThan,
            FilterNode::LessThan { .. } => LeafOperator::LessThan,
            FilterNode::GreaterThanOrEqualTo { .. } => LeafOperator::GreaterThanOrEqualTo,
            FilterNode::LessThanOrEqualTo { .. } => LeafOperator::LessThanOrEqualTo,
            FilterNode::HasText { .. } => LeafOperator::HasText,
            FilterNode::Excludes { .. } => LeafOperator::Excludes,
            FilterNode::Includes { .. } => LeafOperator::Includes,
            FilterNode::Only { .. } => LeafOperator::Only,
            FilterNode::IsTrue { .. } => LeafOperator::IsTrue,
            FilterNode::And { .. } | FilterNode::Or { .. } | FilterNode::Not { .. } => {
                return None
            }
        };
        Some(op)
    }

    /// Target column of the node; `None` for compounds
    pub fn target(&self) -> Option<&str> {
        match self {
            FilterNode::Empty { target }
            | FilterNode::NotEmpty { target }
            | FilterNode::EqualTo { target, .. }
            | FilterNode::IsOneOf { target, .. }
            | FilterNode::GreaterThan { target, .. }
            | FilterNode::LessThan { target, .. }
            | FilterNode::GreaterThanOrEqualTo { target, .. }
            | FilterNode::LessThanOrEqualTo { target, .. }
            | FilterNode::HasText { target, .. }
            | FilterNode::Excludes { target, .. }
            | FilterNode::Includes { target, .. }
            | FilterNode::Only { target, .. }
            | FilterNode::IsTrue { target } => Some(target),
            FilterNode::And { .. } | FilterNode::Or { .. } | FilterNode::Not { .. } => None,
        }
    }

    /// Direct children of the node
    pub fn children(&self) -> Vec<&FilterNode> {
        match self {
            FilterNode::And { operands } | FilterNode::Or { operands } => {
                operands.iter().collect()
            }
            FilterNode::Not { operand } => vec![operand.as_ref()],
            _ => Vec::new(),
        }
    }

    /// Columns referenced anywhere in the tree, in first-seen order
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut seen = IndexSet::new();
        self.collect_targets(&mut seen);
        seen.into_iter().collect()
    }

    fn collect_targets<'a>(&'a self, seen: &mut IndexSet<&'a str>) {
        match self.target() {
            Some(target) => {
                seen.insert(target);
            }
            None => {
                for child in self.children() {
                    child.collect_targets(seen);
                }
            }
        }
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(FilterNode::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Decode a filter tree from its JSON wire form
pub fn parse_filter(json: &str) -> Result<FilterNode, ValidationError> {
    serde_json::from_str(json).map_err(|e| ValidationError::malformed(e.to_string()))
}

/// Decode a filter tree from an already parsed JSON value
pub fn filter_from_value(value: serde_json::Value) -> Result<FilterNode, ValidationError> {
    serde_json::from_value(value).map_err(|e| ValidationError::malformed(e.to_string()))
}

/// Encode a filter tree into its JSON wire form
pub fn to_json(node: &FilterNode) -> serde_json::Result<String> {
    serde_json::to_string(node)
}

struct Literal<'a>(&'a Scalar);

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Scalar::Text(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, values: &[Scalar]) -> fmt::Result {
    write!(f, "[")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", Literal(value))?;
    }
    write!(f, "]")
}

fn write_joined(f: &mut fmt::Formatter<'_>, operands: &[FilterNode], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", sep)?;
        }
        write!(f, "{}", operand)?;
    }
    write!(f, ")")
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::Empty { target } => write!(f, "{} is empty", target),
            FilterNode::NotEmpty { target } => write!(f, "{} is not empty", target),
            FilterNode::EqualTo { target, value } => {
                write!(f, "{} == {}", target, Literal(value))
            }
            FilterNode::IsOneOf { target, values } => {
                write!(f, "{} in ", target)?;
                write_list(f, values)
            }
            FilterNode::GreaterThan { target, value } => {
                write!(f, "{} > {}", target, Literal(value))
            }
            FilterNode::LessThan { target, value } => {
                write!(f, "{} < {}", target, Literal(value))
            }
            FilterNode::GreaterThanOrEqualTo { target, value } => {
                write!(f, "{} >= {}", target, Literal(value))
            }
            FilterNode::LessThanOrEqualTo { target, value } => {
                write!(f, "{} <= {}", target, Literal(value))
            }
            FilterNode::HasText { target, value } => write!(f, "{} has text {:?}", target, value),
            FilterNode::Excludes { target, values } => {
                write!(f, "{} excludes ", target)?;
                write_list(f, values)
            }
            FilterNode::Includes { target, values } => {
                write!(f, "{} includes ", target)?;
                write_list(f, values)
            }
            FilterNode::Only { target, values } => {
                write!(f, "{} only ", target)?;
                write_list(f, values)
            }
            FilterNode::IsTrue { target } => write!(f, "{} is true", target),
            FilterNode::And { operands } if operands.is_empty() => write!(f, "true"),
            FilterNode::Or { operands } if operands.is_empty() => write!(f, "false"),
            FilterNode::And { operands } => write_joined(f, operands, "and"),
            FilterNode::Or { operands } => write_joined(f, operands, "or"),
            FilterNode::Not { operand } => write!(f, "not {}", operand),
        }
    }
}
