//! subq-core: Subdataset registry, set algebra and enumeration
//!
//! This crate manages named subsets ("subdatasets") of a dataset, each
//! defined by a [`FilterNode`](subq_filter::FilterNode) tree.
//!
//! # Features
//!
//! - **Registry**: ordered, uniquely named collection with pure operations
//! - **Set Algebra**: union/intersection merges and negation
//! - **Enumeration**: bulk subdatasets from unique values, boolean columns or topics
//! - **Name Disambiguation**: `A`, `A (2)`, `A (3)` for repeated raw names
//!
//! # Quick Start
//!
//! ```rust
//! use subq_core::{merge_in, negate_in, MergeMode, Registry, Subdataset};
//! use subq_filter::FilterNode;
//!
//! let registry = Registry::new()
//!     .insert_or_replace(Subdataset::new("Drama", FilterNode::equal_to("genre", "Drama")))?
//!     .insert_or_replace(Subdataset::new("Comedy", FilterNode::equal_to("genre", "Comedy")))?;
//!
//! let registry = merge_in(&registry, &["Drama", "Comedy"], "Either", MergeMode::Union, false)?;
//! let registry = negate_in(&registry, "Either")?;
//! assert_eq!(registry.names(), vec!["Drama", "Comedy", "Either", "Not Either"]);
//! # Ok::<(), subq_core::Error>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::doc_markdown
)]

pub mod algebra;
pub mod enumerate;
pub mod error;
pub mod naming;
pub mod registry;
pub mod request;
pub mod subdataset;

pub use algebra::{add_negation, merge, merge_in, negate, negate_in, MergeMode};
pub use enumerate::{
    from_boolean_columns, from_topic_tags, from_topics, from_unique_values, Topic, UniqueValues,
};
pub use error::{Error, Result};
pub use naming::assign_unique_names;
pub use registry::Registry;
pub use request::{RequestToken, RequestTracker};
pub use subdataset::{QueryGroup, Subdataset};
