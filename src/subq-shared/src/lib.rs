//! subq-shared: Shared types and constants for subq crates
//!
//! This crate contains the result alias, naming constants and small string
//! helpers used by the filter model, the subdataset core and the CLI.
//!
//! # Features
//!
//! - **Common Result Type**: Standardized Result type alias
//! - **Version Information**: Build and version metadata
//! - **Naming Constants**: Prefixes and bucket names shared by derived subdatasets

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::doc_markdown
)]

/// Result type alias for subq operations that cross the application boundary
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build information structure
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Package version
    pub version: &'static str,
}

impl BuildInfo {
    /// Build information for the current compilation
    pub fn current() -> Self {
        Self { version: VERSION }
    }
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "subq {}", self.version)
    }
}

/// Common utility functions
pub mod utils {
    /// Check if a string is empty or whitespace-only
    #[must_use]
    pub fn is_blank(s: &str) -> bool {
        s.trim().is_empty()
    }

    /// Split a comma separated list, trimming entries and dropping blanks
    #[must_use]
    pub fn split_list(s: &str) -> Vec<String> {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Case-insensitive substring test
    #[must_use]
    pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Common constants
pub mod constants {
    /// Prefix given to the name of a negated subdataset
    pub const NEGATION_PREFIX: &str = "Not ";

    /// Name of the bucket collecting topics matched by no grouper tag
    pub const UNCATEGORIZED_TOPICS: &str = "Uncategorized Topics";

    /// Maximum nesting depth accepted for a filter tree
    ///
    /// Every `and`/`or` level is two JSON nesting levels (node object and
    /// operand array), and a registry file adds its array, the subdataset
    /// object and a leaf's value list. At this depth a stored tree stays under
    /// serde_json's recursion limit of 128.
    pub const MAX_FILTER_DEPTH: usize = 60;

    /// Name given to a subdataset enumerated from an empty value
    pub const EMPTY_VALUE_NAME: &str = "(empty)";

    /// Number of topic words used to label a topic without an explicit label
    pub const TOPIC_LABEL_WORDS: usize = 3;
}
