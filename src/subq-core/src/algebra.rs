//! Set algebra over subdatasets
//!
//! Merging combines the filters of two or more subdatasets under one `or`
//! (union) or `and` (intersection) node. Nested merges are not flattened:
//! merging a merge adds one level, so the result still shows where each
//! operand came from.
//!
//! Negation wraps a filter in `not`, except that negating a `not` unwraps
//! it. Names are always derived by prefixing the input's name, so negating
//! `X` twice is named `Not Not X` while its filter equals the original.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use subq_filter::FilterNode;
use subq_shared::constants::NEGATION_PREFIX;

use crate::error::{Error, Result};
use crate::registry::{check_depth, Registry};
use crate::subdataset::Subdataset;

/// How merged subdatasets are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Rows in any of the subdatasets
    #[default]
    Union,
    /// Rows in all of the subdatasets
    Intersection,
}

impl MergeMode {
    /// Wire name of the mode
    pub fn as_str(self) -> &'static str {
        match self {
            MergeMode::Union => "union",
            MergeMode::Intersection => "intersection",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "union" => Ok(MergeMode::Union),
            "intersection" => Ok(MergeMode::Intersection),
            other => Err(format!("Unknown merge mode: {other}")),
        }
    }
}

/// Combine the filters of `targets` into a new visible subdataset
pub fn merge(targets: &[Subdataset], new_name: &str, mode: MergeMode) -> Result<Subdataset> {
    if targets.len() < 2 {
        return Err(Error::InsufficientOperands {
            found: targets.len(),
        });
    }
    if new_name.is_empty() {
        return Err(Error::EmptyName);
    }

    let operands = targets.iter().map(|t| t.filter.clone()).collect();
    let filter = match mode {
        MergeMode::Union => FilterNode::or(operands),
        MergeMode::Intersection => FilterNode::and(operands),
    };
    check_depth(&filter)?;
    Ok(Subdataset::new(new_name, filter))
}

/// Merge registry members by name and store the result
///
/// The result replaces a subdataset already named `new_name` in place, or
/// is appended. With `remove_sources`, the merged subdatasets are dropped,
/// except a source named `new_name`, whose slot the result takes over.
pub fn merge_in<S: AsRef<str>>(
    registry: &Registry,
    target_names: &[S],
    new_name: &str,
    mode: MergeMode,
    remove_sources: bool,
) -> Result<Registry> {
    let targets = target_names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            registry
                .get(name)
                .cloned()
                .ok_or_else(|| Error::UnknownSubdataset(name.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;
    let merged = merge(&targets, new_name, mode)?;
    log::debug!(
        "merging {} subdataset(s) into '{}' ({})",
        targets.len(),
        new_name,
        mode
    );

    let base = if remove_sources {
        let doomed: Vec<&str> = targets
            .iter()
            .map(|t| t.name.as_str())
            .filter(|name| *name != new_name)
            .collect();
        registry.remove_all(&doomed)
    } else {
        registry.clone()
    };
    base.insert_or_replace(merged)
}

/// The complement of a subdataset
pub fn negate(subdataset: &Subdataset) -> Subdataset {
    let filter = match &subdataset.filter {
        FilterNode::Not { operand } => operand.as_ref().clone(),
        other => FilterNode::not(other.clone()),
    };
    Subdataset::new(format!("{}{}", NEGATION_PREFIX, subdataset.name), filter)
}

/// Store the negation of `original` in a registry
///
/// An existing subdataset with the negation's name is overwritten in place;
/// otherwise the negation goes right after `original`, or at the end when
/// `original` is no longer in the registry.
pub fn add_negation(registry: &Registry, original: &Subdataset) -> Result<Registry> {
    let negated = negate(original);
    log::debug!("negating '{}' as '{}'", original.name, negated.name);
    registry.insert_after(&original.name, negated)
}

/// Negate a registry member by name and store the result
pub fn negate_in(registry: &Registry, name: &str) -> Result<Registry> {
    let original = registry
        .get(name)
        .ok_or_else(|| Error::UnknownSubdataset(name.to_string()))?;
    add_negation(registry, original)
}
