//! Named subsets of a dataset

use serde::{Deserialize, Serialize};
use subq_filter::FilterNode;

fn default_visible() -> bool {
    true
}

/// A named view of the dataset defined by one filter tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subdataset {
    /// Display name, unique within a registry
    pub name: String,
    /// Rows belonging to the subset
    pub filter: FilterNode,
    /// Whether consumers should show the subset
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl Subdataset {
    /// Create a visible subdataset
    pub fn new(name: impl Into<String>, filter: FilterNode) -> Self {
        Self {
            name: name.into(),
            filter,
            visible: true,
        }
    }

    /// Same subdataset with the given visibility
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// Subdataset as sent to query and chart consumers
///
/// A `null` filter stands for the whole dataset, the implicit default group
/// some consumers append after the user's subdatasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryGroup {
    /// Display name
    pub name: String,
    /// Rows belonging to the group; `None` for every row
    pub filter: Option<FilterNode>,
    /// Whether consumers should show the group
    pub visible: bool,
}

impl QueryGroup {
    /// The group covering the whole dataset
    pub fn whole_dataset(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filter: None,
            visible: true,
        }
    }
}

impl From<&Subdataset> for QueryGroup {
    fn from(s: &Subdataset) -> Self {
        Self {
            name: s.name.clone(),
            filter: Some(s.filter.clone()),
            visible: s.visible,
        }
    }
}

impl From<Subdataset> for QueryGroup {
    fn from(s: Subdataset) -> Self {
        Self {
            name: s.name,
            filter: Some(s.filter),
            visible: s.visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let s = Subdataset::new("Top rated", FilterNode::equal_to("rating", 5));
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({
                "name": "Top rated",
                "filter": { "type": "equal_to", "target": "rating", "value": 5 },
                "visible": true
            })
        );
    }

    #[test]
    fn test_visible_defaults_to_true() {
        let s: Subdataset = serde_json::from_value(json!({
            "name": "All",
            "filter": { "type": "and", "operands": [] }
        }))
        .unwrap();
        assert!(s.visible);
        assert_eq!(s.filter, FilterNode::match_all());
        assert!(!s.with_visible(false).visible);
    }

    #[test]
    fn test_whole_dataset_group_serializes_null_filter() {
        assert_eq!(
            serde_json::to_value(QueryGroup::whole_dataset("Whole dataset")).unwrap(),
            json!({ "name": "Whole dataset", "filter": null, "visible": true })
        );

        let group = QueryGroup::from(Subdataset::new("x", FilterNode::is_true("x")));
        assert_eq!(group.filter, Some(FilterNode::is_true("x")));
    }
}
