//! Column types and the operators each of them admits
//!
//! Every dataset column is assigned one [`ColumnType`] when the dataset is
//! configured. The type decides which leaf filters may target the column:
//! a categorical column can be compared for equality but never ordered, a
//! boolean column only answers `is_true`, and so on. [`OperatorRegistry`]
//! holds that table and lets callers override individual rows.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{UnknownColumnType, UnknownOperator};

/// Semantic type of a dataset column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Unordered labels
    Categorical,
    /// Labels with a meaningful order
    OrderedCategorical,
    /// Real-valued measurements
    Continuous,
    /// Dates and timestamps
    Temporal,
    /// Free text
    Textual,
    /// Identifier-like values, distinct per row
    Unique,
    /// A set of labels per row
    MultiCategorical,
    /// Coordinates or shapes
    Geospatial,
    /// Topic assignment produced by a topic model
    Topic,
    /// True/false flags
    Boolean,
}

impl ColumnType {
    /// Every column type, in declaration order
    pub const ALL: [ColumnType; 10] = [
        ColumnType::Categorical,
        ColumnType::OrderedCategorical,
        ColumnType::Continuous,
        ColumnType::Temporal,
        ColumnType::Textual,
        ColumnType::Unique,
        ColumnType::MultiCategorical,
        ColumnType::Geospatial,
        ColumnType::Topic,
        ColumnType::Boolean,
    ];

    /// Wire name of the column type
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Categorical => "categorical",
            ColumnType::OrderedCategorical => "ordered_categorical",
            ColumnType::Continuous => "continuous",
            ColumnType::Temporal => "temporal",
            ColumnType::Textual => "textual",
            ColumnType::Unique => "unique",
            ColumnType::MultiCategorical => "multi_categorical",
            ColumnType::Geospatial => "geospatial",
            ColumnType::Topic => "topic",
            ColumnType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = UnknownColumnType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| UnknownColumnType(s.to_string()))
    }
}

/// Kind of a leaf filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafOperator {
    /// Value is missing
    Empty,
    /// Value is present
    NotEmpty,
    /// Value equals a scalar
    EqualTo,
    /// Value is one of a list of scalars
    IsOneOf,
    /// Value is strictly greater than a scalar
    GreaterThan,
    /// Value is strictly less than a scalar
    LessThan,
    /// Value is greater than or equal to a scalar
    GreaterThanOrEqualTo,
    /// Value is less than or equal to a scalar
    LessThanOrEqualTo,
    /// Text contains a fragment
    HasText,
    /// Label set shares nothing with a list
    Excludes,
    /// Label set contains every entry of a list
    Includes,
    /// Label set is exactly a list
    Only,
    /// Flag is set
    IsTrue,
}

impl LeafOperator {
    /// Every leaf operator, in declaration order
    pub const ALL: [LeafOperator; 13] = [
        LeafOperator::Empty,
        LeafOperator::NotEmpty,
        LeafOperator::EqualTo,
        LeafOperator::IsOneOf,
        LeafOperator::GreaterThan,
        LeafOperator::LessThan,
        LeafOperator::GreaterThanOrEqualTo,
        LeafOperator::LessThanOrEqualTo,
        LeafOperator::HasText,
        LeafOperator::Excludes,
        LeafOperator::Includes,
        LeafOperator::Only,
        LeafOperator::IsTrue,
    ];

    /// Wire name of the operator, identical to the `type` tag of its leaf
    pub fn as_str(self) -> &'static str {
        match self {
            LeafOperator::Empty => "empty",
            LeafOperator::NotEmpty => "not_empty",
            LeafOperator::EqualTo => "equal_to",
            LeafOperator::IsOneOf => "is_one_of",
            LeafOperator::GreaterThan => "greater_than",
            LeafOperator::LessThan => "less_than",
            LeafOperator::GreaterThanOrEqualTo => "greater_than_or_equal_to",
            LeafOperator::LessThanOrEqualTo => "less_than_or_equal_to",
            LeafOperator::HasText => "has_text",
            LeafOperator::Excludes => "excludes",
            LeafOperator::Includes => "includes",
            LeafOperator::Only => "only",
            LeafOperator::IsTrue => "is_true",
        }
    }
}

impl fmt::Display for LeafOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeafOperator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeafOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

/// Set of leaf operators, ordered by declaration
pub type OperatorSet = BTreeSet<LeafOperator>;

const PRESENCE: [LeafOperator; 2] = [LeafOperator::Empty, LeafOperator::NotEmpty];

const ORDERING: [LeafOperator; 4] = [
    LeafOperator::GreaterThan,
    LeafOperator::LessThan,
    LeafOperator::GreaterThanOrEqualTo,
    LeafOperator::LessThanOrEqualTo,
];

/// Built-in operator table for a column type
pub fn allowed_operators(column_type: ColumnType) -> OperatorSet {
    let mut set: OperatorSet = PRESENCE.into_iter().collect();
    match column_type {
        ColumnType::Categorical | ColumnType::Topic => {
            set.extend([LeafOperator::EqualTo, LeafOperator::IsOneOf]);
        }
        ColumnType::OrderedCategorical => {
            set.extend([LeafOperator::EqualTo, LeafOperator::IsOneOf]);
            set.extend(ORDERING);
        }
        ColumnType::Continuous | ColumnType::Temporal => {
            set.insert(LeafOperator::EqualTo);
            set.extend(ORDERING);
        }
        ColumnType::Textual => {
            set.extend([LeafOperator::EqualTo, LeafOperator::HasText]);
        }
        ColumnType::Unique => {
            set.extend([
                LeafOperator::EqualTo,
                LeafOperator::IsOneOf,
                LeafOperator::HasText,
            ]);
        }
        ColumnType::MultiCategorical => {
            set.extend([
                LeafOperator::Excludes,
                LeafOperator::Includes,
                LeafOperator::Only,
            ]);
        }
        ColumnType::Geospatial => {}
        ColumnType::Boolean => {
            set.insert(LeafOperator::IsTrue);
        }
    }
    set
}

/// Built-in operator table looked up by column type name
///
/// Unregistered names yield the empty set.
pub fn allowed_operators_named(column_type: &str) -> OperatorSet {
    column_type
        .parse::<ColumnType>()
        .map(allowed_operators)
        .unwrap_or_default()
}

/// Operator table with optional per-type overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorRegistry {
    overrides: HashMap<ColumnType, OperatorSet>,
}

impl OperatorRegistry {
    /// Registry using only the built-in table
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the operators allowed for one column type
    #[must_use]
    pub fn with_override(
        mut self,
        column_type: ColumnType,
        operators: impl IntoIterator<Item = LeafOperator>,
    ) -> Self {
        self.overrides
            .insert(column_type, operators.into_iter().collect());
        self
    }

    /// Operators allowed for a column type
    pub fn allowed(&self, column_type: ColumnType) -> OperatorSet {
        self.overrides
            .get(&column_type)
            .cloned()
            .unwrap_or_else(|| allowed_operators(column_type))
    }

    /// Operators allowed for a column type given by name
    pub fn allowed_named(&self, column_type: &str) -> OperatorSet {
        column_type
            .parse::<ColumnType>()
            .map(|ty| self.allowed(ty))
            .unwrap_or_default()
    }

    /// Whether `operator` may target a column of `column_type`
    pub fn permits(&self, column_type: ColumnType, operator: LeafOperator) -> bool {
        match self.overrides.get(&column_type) {
            Some(set) => set.contains(&operator),
            None => allowed_operators(column_type).contains(&operator),
        }
    }

    /// Whether any column type has been overridden
    pub fn is_customized(&self) -> bool {
        !self.overrides.is_empty()
    }
}
