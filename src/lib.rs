//! subq: named, reusable subsets of a dataset
//!
//! A subdataset is a name plus a boolean filter tree over typed columns.
//! This crate re-exports the pieces:
//!
//! - [`filter`]: the filter expression model, the column type registry and
//!   validation against a schema
//! - [`subdatasets`]: the subdataset registry, set algebra (merge, negate) and bulk
//!   enumeration
//! - [`shared`]: constants and helpers shared by both
//!
//! ```rust
//! use subq::filter::{validate, ColumnType, FilterNode, Schema};
//! use subq::subdatasets::{negate, Registry, Subdataset};
//!
//! let schema = Schema::new()
//!     .with_column("genre", ColumnType::Categorical)
//!     .with_column("rating", ColumnType::OrderedCategorical);
//!
//! let drama = Subdataset::new(
//!     "Good drama",
//!     FilterNode::and(vec![
//!         FilterNode::equal_to("genre", "Drama"),
//!         FilterNode::GreaterThanOrEqualTo { target: "rating".into(), value: 4.into() },
//!     ]),
//! );
//! validate(&drama.filter, &schema)?;
//!
//! let registry = Registry::new()
//!     .insert_validated(drama.clone(), &schema)?
//!     .insert_or_replace(negate(&drama))?;
//! assert_eq!(registry.names(), vec!["Good drama", "Not Good drama"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use subq_core as subdatasets;
pub use subq_filter as filter;
pub use subq_shared as shared;

pub use subq_core::{Error, MergeMode, Registry, Subdataset};
pub use subq_filter::{ColumnType, FilterNode, ValidationError};
