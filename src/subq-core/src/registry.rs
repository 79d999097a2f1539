//! Ordered, uniquely named collection of subdatasets
//!
//! A [`Registry`] is an immutable snapshot. Every operation returns a new
//! registry and leaves the receiver untouched, so a caller holding the old
//! value never observes a half-applied change. After every operation all
//! names are non-empty and pairwise distinct.
//!
//! Order is significant and only changes through [`Registry::reorder`] or
//! by appending.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use subq_filter::{
    validate, validate_with, ColumnTypes, FilterNode, OperatorRegistry, ValidationError,
    ValidationReason,
};
use subq_shared::constants::MAX_FILTER_DEPTH;

use crate::error::{Error, Result};
use crate::subdataset::{QueryGroup, Subdataset};

/// Ordered collection of subdatasets with unique names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Subdataset>", into = "Vec<Subdataset>")]
pub struct Registry {
    items: Vec<Subdataset>,
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        Err(Error::EmptyName)
    } else {
        Ok(())
    }
}

/// Reject trees nested deeper than a registry file can hold
pub(crate) fn check_depth(filter: &FilterNode) -> Result<()> {
    if filter.depth() > MAX_FILTER_DEPTH {
        return Err(ValidationError::new(
            "$",
            ValidationReason::TooDeep {
                max: MAX_FILTER_DEPTH,
            },
        )
        .into());
    }
    Ok(())
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list, rejecting empty or repeated names and
    /// over-deep filters
    pub fn from_subdatasets(items: Vec<Subdataset>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for s in &items {
            check_name(&s.name)?;
            check_depth(&s.filter)?;
            if !seen.insert(s.name.as_str()) {
                return Err(Error::DuplicateName(s.name.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Decode a registry from a JSON array of subdatasets
    pub fn from_json(json: &str) -> Result<Self> {
        let items: Vec<Subdataset> = serde_json::from_str(json)?;
        Self::from_subdatasets(items)
    }

    /// Encode the registry as a JSON array of subdatasets
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.items)?)
    }

    /// Number of subdatasets
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the registry holds no subdataset
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in registry order
    pub fn iter(&self) -> std::slice::Iter<'_, Subdataset> {
        self.items.iter()
    }

    /// Look up a subdataset by name
    pub fn get(&self, name: &str) -> Option<&Subdataset> {
        self.items.iter().find(|s| s.name == name)
    }

    /// Index of the named subdataset
    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|s| s.name == name)
    }

    /// Whether a subdataset has this name
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Names in registry order
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|s| s.name.as_str()).collect()
    }

    /// Visible subdatasets in registry order
    pub fn visible(&self) -> impl Iterator<Item = &Subdataset> {
        self.items.iter().filter(|s| s.visible)
    }

    /// Replace the subdataset with the same name in place, or append
    pub fn insert_or_replace(&self, subdataset: Subdataset) -> Result<Self> {
        check_name(&subdataset.name)?;
        check_depth(&subdataset.filter)?;
        let mut items = self.items.clone();
        match self.position(&subdataset.name) {
            Some(index) => {
                log::debug!("replacing subdataset '{}' at {}", subdataset.name, index);
                items[index] = subdataset;
            }
            None => {
                log::debug!("appending subdataset '{}'", subdataset.name);
                items.push(subdataset);
            }
        }
        Ok(Self { items })
    }

    /// Validate the subdataset's filter, then insert or replace it
    pub fn insert_validated<C>(&self, subdataset: Subdataset, columns: &C) -> Result<Self>
    where
        C: ColumnTypes + ?Sized,
    {
        validate(&subdataset.filter, columns)?;
        self.insert_or_replace(subdataset)
    }

    /// Insert directly after `anchor`, or append when `anchor` is absent
    ///
    /// Replaces in place when the name already exists.
    pub(crate) fn insert_after(&self, anchor: &str, subdataset: Subdataset) -> Result<Self> {
        if self.contains(&subdataset.name) {
            return self.insert_or_replace(subdataset);
        }
        check_name(&subdataset.name)?;
        check_depth(&subdataset.filter)?;
        let mut items = self.items.clone();
        match self.position(anchor) {
            Some(index) => {
                log::debug!("inserting subdataset '{}' after '{}'", subdataset.name, anchor);
                items.insert(index + 1, subdataset);
            }
            None => items.push(subdataset),
        }
        Ok(Self { items })
    }

    /// Drop the named subdataset; absent names leave the registry unchanged
    #[must_use]
    pub fn remove(&self, name: &str) -> Self {
        log::debug!("removing subdataset '{}'", name);
        Self {
            items: self
                .items
                .iter()
                .filter(|s| s.name != name)
                .cloned()
                .collect(),
        }
    }

    /// Drop every named subdataset
    #[must_use]
    pub fn remove_all<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let doomed: HashSet<&str> = names.iter().map(|name| name.as_ref()).collect();
        Self {
            items: self
                .items
                .iter()
                .filter(|s| !doomed.contains(s.name.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Show or hide the named subdataset
    #[must_use]
    pub fn set_visibility(&self, name: &str, visible: bool) -> Self {
        let mut items = self.items.clone();
        match items.iter_mut().find(|s| s.name == name) {
            Some(s) => s.visible = visible,
            None => log::warn!("cannot change visibility of unknown subdataset '{}'", name),
        }
        Self { items }
    }

    /// Show or hide every subdataset
    #[must_use]
    pub fn set_all_visibility(&self, visible: bool) -> Self {
        Self {
            items: self
                .items
                .iter()
                .cloned()
                .map(|s| s.with_visible(visible))
                .collect(),
        }
    }

    /// Rename a subdataset, keeping its position
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<Self> {
        check_name(new_name)?;
        if old_name == new_name {
            return Ok(self.clone());
        }
        if self.contains(new_name) {
            return Err(Error::DuplicateName(new_name.to_string()));
        }

        let mut items = self.items.clone();
        match items.iter_mut().find(|s| s.name == old_name) {
            Some(s) => {
                log::debug!("renaming subdataset '{}' to '{}'", old_name, new_name);
                s.name = new_name.to_string();
            }
            None => log::warn!("cannot rename unknown subdataset '{}'", old_name),
        }
        Ok(Self { items })
    }

    /// Permute the registry to follow `order`
    ///
    /// Names in `order` that the registry lacks are ignored, repeated names
    /// count once, and subdatasets not mentioned are dropped.
    #[must_use]
    pub fn reorder<S: AsRef<str>>(&self, order: &[S]) -> Self {
        let mut placed = HashSet::new();
        let mut items = Vec::with_capacity(order.len());
        for name in order.iter().map(|name| name.as_ref()) {
            if !placed.insert(name) {
                continue;
            }
            match self.get(name) {
                Some(s) => items.push(s.clone()),
                None => log::warn!("ignoring unknown subdataset '{}' in reorder", name),
            }
        }
        if items.len() < self.items.len() {
            log::debug!(
                "reorder dropped {} subdataset(s)",
                self.items.len() - items.len()
            );
        }
        Self { items }
    }

    /// Replace the whole collection, rejecting empty or repeated names
    pub fn replace_all(&self, items: Vec<Subdataset>) -> Result<Self> {
        let replaced = Self::from_subdatasets(items)?;
        log::debug!(
            "replaced {} subdataset(s) with {}",
            self.items.len(),
            replaced.len()
        );
        Ok(replaced)
    }

    /// Validate every filter against a schema, then replace the whole
    /// collection
    ///
    /// The first invalid filter refuses the whole list.
    pub fn replace_all_validated<C>(
        &self,
        items: Vec<Subdataset>,
        columns: &C,
        operators: &OperatorRegistry,
    ) -> Result<Self>
    where
        C: ColumnTypes + ?Sized,
    {
        for s in &items {
            validate_with(&s.filter, columns, operators).map_err(|e| {
                log::warn!("refusing generated subdataset '{}': {}", s.name, e);
                e
            })?;
        }
        self.replace_all(items)
    }

    /// The empty registry
    #[must_use]
    pub fn reset(&self) -> Self {
        log::debug!("resetting {} subdataset(s)", self.items.len());
        Self::new()
    }

    /// Visible subdatasets in consumer form, optionally followed by the
    /// whole-dataset group
    pub fn query_groups(&self, whole_dataset: Option<&str>) -> Vec<QueryGroup> {
        self.visible()
            .map(QueryGroup::from)
            .chain(whole_dataset.map(QueryGroup::whole_dataset))
            .collect()
    }
}

impl TryFrom<Vec<Subdataset>> for Registry {
    type Error = Error;

    fn try_from(items: Vec<Subdataset>) -> Result<Self> {
        Self::from_subdatasets(items)
    }
}

impl From<Registry> for Vec<Subdataset> {
    fn from(registry: Registry) -> Self {
        registry.items
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Subdataset;
    type IntoIter = std::slice::Iter<'a, Subdataset>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
