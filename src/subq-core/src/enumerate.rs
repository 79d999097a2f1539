//! Bulk generation of subdatasets
//!
//! Each generator returns a complete replacement list; nothing is merged
//! with an existing registry. Apply the list with
//! [`Registry::replace_all`](crate::Registry::replace_all), which refuses it
//! atomically if the names collide.
//!
//! The unique values and topics consumed here come from external services.
//! Their wire shapes are [`UniqueValues`] and [`Topic`].

use serde::{Deserialize, Serialize};
use subq_filter::{FilterNode, Scalar};
use subq_shared::constants::{EMPTY_VALUE_NAME, TOPIC_LABEL_WORDS, UNCATEGORIZED_TOPICS};
use subq_shared::utils::contains_ignore_case;

use crate::error::{Error, Result};
use crate::naming::assign_unique_names;
use crate::subdataset::Subdataset;

/// Response of the unique-value service for one column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniqueValues {
    /// Distinct values, in the order the service reports them
    pub values: Vec<Scalar>,
}

/// A topic reported by the topic service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Topic identifier, the value stored in the topic column
    pub id: i64,
    /// Free-form tags attached to the topic
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Human-given label
    #[serde(default)]
    pub label: Option<String>,
    /// Representative words with their weights, strongest first
    #[serde(default)]
    pub words: Vec<(String, f64)>,
}

impl Topic {
    /// Label shown for the topic
    ///
    /// The explicit label when present, else the leading words, else the id.
    pub fn display_label(&self) -> String {
        if let Some(label) = self.label.as_deref().filter(|l| !l.is_empty()) {
            return label.to_string();
        }
        if !self.words.is_empty() {
            return self
                .words
                .iter()
                .take(TOPIC_LABEL_WORDS)
                .map(|(word, _)| word.as_str())
                .collect::<Vec<_>>()
                .join(", ");
        }
        format!("Topic {}", self.id)
    }

    /// Whether any of the topic's tags contains `tag`, ignoring case
    pub fn matches_tag(&self, tag: &str) -> bool {
        self.tags
            .iter()
            .flatten()
            .any(|own| contains_ignore_case(own, tag))
    }
}

/// One `equal_to` subdataset per value, named after the value
///
/// Values are not deduplicated; repeated values get suffixed names. A value
/// that prints as an empty string is named [`EMPTY_VALUE_NAME`], while its
/// filter still matches the empty value.
pub fn from_unique_values(column: &str, values: &[Scalar]) -> Vec<Subdataset> {
    let names = assign_unique_names(values.iter().map(|value| match value.to_string() {
        printed if printed.is_empty() => EMPTY_VALUE_NAME.to_string(),
        printed => printed,
    }));
    log::debug!("enumerating {} value(s) of '{}'", values.len(), column);
    names
        .into_iter()
        .zip(values)
        .map(|(name, value)| Subdataset::new(name, FilterNode::equal_to(column, value.clone())))
        .collect()
}

/// One subdataset per boolean column, holding the rows where it is true
///
/// The resulting subsets may overlap: a row can be true in several columns.
pub fn from_boolean_columns<S: AsRef<str>>(columns: &[S]) -> Vec<Subdataset> {
    columns
        .iter()
        .map(|column| {
            let column: &str = column.as_ref();
            Subdataset::new(column, FilterNode::and(vec![FilterNode::is_true(column)]))
        })
        .collect()
}

/// One subdataset per topic
pub fn from_topics(topic_column: &str, topics: &[Topic]) -> Vec<Subdataset> {
    let names = assign_unique_names(topics.iter().map(Topic::display_label));
    names
        .into_iter()
        .zip(topics)
        .map(|(name, topic)| {
            Subdataset::new(
                name,
                FilterNode::and(vec![FilterNode::equal_to(topic_column, topic.id)]),
            )
        })
        .collect()
}

/// One subdataset per grouper tag, plus a bucket for untagged topics
///
/// A tag's subdataset covers every topic whose tags contain it. Topics
/// matched by no tag form a final `Uncategorized Topics` subdataset, which is
/// omitted when empty. Tags matching no topic still produce a subdataset.
pub fn from_topic_tags<S: AsRef<str>>(
    topic_column: &str,
    topics: &[Topic],
    tags: &[S],
) -> Result<Vec<Subdataset>> {
    if tags.is_empty() {
        return Err(Error::NoGrouperTags);
    }

    let is_one_of = |ids: Vec<i64>| {
        FilterNode::is_one_of(topic_column, ids.into_iter().map(Scalar::from).collect())
    };

    let groups: Vec<Vec<i64>> = tags
        .iter()
        .map(|tag| {
            topics
                .iter()
                .filter(|topic| topic.matches_tag(tag.as_ref()))
                .map(|topic| topic.id)
                .collect()
        })
        .collect();

    let uncategorized: Vec<i64> = topics
        .iter()
        .filter(|topic| !tags.iter().any(|tag| topic.matches_tag(tag.as_ref())))
        .map(|topic| topic.id)
        .collect();

    let names = assign_unique_names(
        tags.iter()
            .map(|tag| tag.as_ref())
            .chain(std::iter::once(UNCATEGORIZED_TOPICS)),
    );
    log::debug!(
        "grouping {} topic(s) under {} tag(s), {} uncategorized",
        topics.len(),
        tags.len(),
        uncategorized.len()
    );

    let mut names = names.into_iter();
    let mut subdatasets: Vec<Subdataset> = groups
        .into_iter()
        .zip(names.by_ref())
        .map(|(ids, name)| Subdataset::new(name, is_one_of(ids)))
        .collect();

    if !uncategorized.is_empty() {
        if let Some(name) = names.next() {
            subdatasets.push(Subdataset::new(name, is_one_of(uncategorized)));
        }
    }
    Ok(subdatasets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn topic(id: i64, tags: &[&str]) -> Topic {
        Topic {
            id,
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            label: Some(format!("topic {id}")),
            words: Vec::new(),
        }
    }

    #[test]
    fn test_unique_values_keep_duplicates() {
        let values: Vec<Scalar> = vec![1.into(), 2.into(), 2.into(), 3.into()];
        let subdatasets = from_unique_values("rating", &values);
        assert_eq!(subdatasets.len(), 4);

        let names: Vec<&str> = subdatasets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["1", "2", "2 (2)", "3"]);
        for (s, value) in subdatasets.iter().zip(&values) {
            assert_eq!(s.filter, FilterNode::equal_to("rating", value.clone()));
            assert!(s.visible);
        }
    }

    #[test]
    fn test_empty_value_gets_placeholder_name() {
        let values: Vec<Scalar> = vec!["".into(), "x".into(), "".into()];
        let subdatasets = from_unique_values("genre", &values);

        let names: Vec<&str> = subdatasets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec![EMPTY_VALUE_NAME, "x", "(empty) (2)"]);
        assert_eq!(subdatasets[0].filter, FilterNode::equal_to("genre", ""));

        let registry = crate::Registry::new().replace_all(subdatasets).unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_boolean_columns() {
        let subdatasets = from_boolean_columns(&["A", "B"]);
        assert_eq!(
            subdatasets,
            vec![
                Subdataset::new("A", FilterNode::and(vec![FilterNode::is_true("A")])),
                Subdataset::new("B", FilterNode::and(vec![FilterNode::is_true("B")])),
            ]
        );
    }

    #[test]
    fn test_topics_without_grouping() {
        let topics = vec![
            topic(7, &[]),
            Topic {
                id: 8,
                tags: None,
                label: None,
                words: vec![
                    ("rain".to_string(), 0.5),
                    ("snow".to_string(), 0.3),
                    ("wind".to_string(), 0.1),
                    ("hail".to_string(), 0.05),
                ],
            },
            Topic {
                label: Some("topic 7".to_string()),
                ..topic(9, &[])
            },
        ];

        let subdatasets = from_topics("topic", &topics);
        let names: Vec<&str> = subdatasets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["topic 7", "rain, snow, wind", "topic 7 (2)"]);
        assert_eq!(
            subdatasets[1].filter,
            FilterNode::and(vec![FilterNode::equal_to("topic", 8)])
        );
    }

    #[test]
    fn test_display_label_fallbacks() {
        let mut t = topic(3, &[]);
        t.label = Some(String::new());
        assert_eq!(t.display_label(), "Topic 3");
        t.words.push(("sun".to_string(), 1.0));
        assert_eq!(t.display_label(), "sun");
    }

    #[test]
    fn test_tag_grouping_completeness() {
        let topics = vec![topic(1, &["x"]), topic(2, &["y"]), topic(3, &[])];
        let subdatasets = from_topic_tags("topic", &topics, &["x"]).unwrap();
        assert_eq!(
            subdatasets,
            vec![
                Subdataset::new("x", FilterNode::is_one_of("topic", vec![1.into()])),
                Subdataset::new(
                    "Uncategorized Topics",
                    FilterNode::is_one_of("topic", vec![2.into(), 3.into()])
                ),
            ]
        );
    }

    #[test]
    fn test_tag_matching_is_case_insensitive_substring() {
        let topics = vec![
            topic(1, &["Climate Policy"]),
            topic(2, &["policy"]),
            Topic {
                id: 3,
                tags: None,
                label: None,
                words: Vec::new(),
            },
        ];
        let subdatasets = from_topic_tags("topic", &topics, &["POLICY", "sport"]).unwrap();
        let names: Vec<&str> = subdatasets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["POLICY", "sport", "Uncategorized Topics"]);
        assert_eq!(
            subdatasets[0].filter,
            FilterNode::is_one_of("topic", vec![1.into(), 2.into()])
        );
        assert_eq!(subdatasets[1].filter, FilterNode::is_one_of("topic", vec![]));
        assert_eq!(
            subdatasets[2].filter,
            FilterNode::is_one_of("topic", vec![3.into()])
        );
    }

    #[test]
    fn test_uncategorized_bucket_omitted_when_empty() {
        let topics = vec![topic(1, &["x"]), topic(2, &["x", "y"])];
        let subdatasets = from_topic_tags("topic", &topics, &["x", "y", "x"]).unwrap();
        let names: Vec<&str> = subdatasets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "x (2)"]);
    }

    #[test]
    fn test_no_grouper_tags() {
        let topics = vec![topic(1, &["x"])];
        assert!(matches!(
            from_topic_tags::<&str>("topic", &topics, &[]),
            Err(Error::NoGrouperTags)
        ));
    }

    #[test]
    fn test_topic_wire_shape() {
        let topics: Vec<Topic> = serde_json::from_str(
            r#"[{"id": 4, "tags": null, "label": null, "words": [["tax", 0.7], ["rate", 0.2]]}]"#,
        )
        .unwrap();
        assert_eq!(topics[0].id, 4);
        assert_eq!(topics[0].tags, None);
        assert_eq!(topics[0].display_label(), "tax, rate");

        let values: UniqueValues = serde_json::from_str(r#"{"values": ["a", 2]}"#).unwrap();
        assert_eq!(values.values, vec![Scalar::from("a"), Scalar::from(2)]);
    }
}
