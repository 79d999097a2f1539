//! subq-filter: Typed filter expression trees
//!
//! This crate defines the boolean filter language used to carve named
//! subsets out of a tabular dataset. A filter is a tree of leaf predicates
//! over typed columns, combined with `and`, `or` and `not`.
//!
//! # Features
//!
//! - **Column Type Registry**: which leaf operators each column type admits
//! - **Filter Trees**: a tagged enum with exhaustive matching over every kind
//! - **Validation**: construction-time checks with the path of the offending node
//! - **Wire Format**: JSON objects discriminated by `type`
//!
//! # Quick Start
//!
//! ```rust
//! use subq_filter::{validate, ColumnType, FilterNode, Schema};
//!
//! let schema = Schema::new()
//!     .with_column("genre", ColumnType::Categorical)
//!     .with_column("active", ColumnType::Boolean);
//!
//! let filter = FilterNode::and(vec![
//!     FilterNode::equal_to("genre", "Drama"),
//!     FilterNode::is_true("active"),
//! ]);
//! validate(&filter, &schema)?;
//!
//! let json = subq_filter::to_json(&filter).unwrap();
//! assert!(json.starts_with(r#"{"type":"and""#));
//! # Ok::<(), subq_filter::ValidationError>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::doc_markdown
)]

pub mod ast;
pub mod column;
pub mod error;
pub mod validate;
pub mod value;

pub use ast::{filter_from_value, parse_filter, to_json, FilterNode};
pub use column::{
    allowed_operators, allowed_operators_named, ColumnType, LeafOperator, OperatorRegistry,
    OperatorSet,
};
pub use error::{UnknownColumnType, UnknownOperator, ValidationError, ValidationReason};
pub use validate::{validate, validate_with, ColumnTypes, Schema};
pub use value::Scalar;
