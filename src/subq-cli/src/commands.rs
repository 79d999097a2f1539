//! Command execution
//!
//! Each command reads its inputs, runs one core operation, and produces an
//! [`Output`]. Writing the output is kept separate so commands can be
//! exercised without touching stdout.

use crate::cli::{Commands, EnumerateSource};
use crate::config::Config;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use subq_core::{
    assign_unique_names, from_boolean_columns, from_topic_tags, from_topics, from_unique_values,
    merge_in, negate_in, Registry, Subdataset, Topic, UniqueValues,
};
use subq_filter::{validate_with, Scalar};
use subq_shared::utils::{is_blank, split_list};
use subq_shared::Result;

/// What a command produced
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// A JSON document
    Json(serde_json::Value),
    /// Plain text lines
    Text(String),
}

impl Output {
    fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Render the output, pretty-printing JSON when asked to
    pub fn render(&self, pretty: bool) -> Result<String> {
        Ok(match self {
            Output::Json(value) if pretty => serde_json::to_string_pretty(value)?,
            Output::Json(value) => serde_json::to_string(value)?,
            Output::Text(text) => text.clone(),
        })
    }
}

/// Unique values either wrapped as the service sends them or as a bare list
#[derive(Deserialize)]
#[serde(untagged)]
enum ValuesInput {
    Wrapped(UniqueValues),
    Bare(Vec<Scalar>),
}

impl From<ValuesInput> for Vec<Scalar> {
    fn from(input: ValuesInput) -> Self {
        match input {
            ValuesInput::Wrapped(unique) => unique.values,
            ValuesInput::Bare(values) => values,
        }
    }
}

/// Run one command against the given configuration
pub fn execute(command: &Commands, config: &Config) -> Result<Output> {
    match command {
        Commands::Operators { column_type } => {
            let allowed = config.operator_registry()?.allowed_named(column_type);
            if allowed.is_empty() {
                log::warn!("no operators allowed for column type '{}'", column_type);
            }
            Output::json(&allowed)
        }
        Commands::Names { input } => {
            let text = read_input(input.as_deref())?;
            let raw: Vec<&str> = text.lines().filter(|line| !is_blank(line)).collect();
            Output::json(&assign_unique_names(raw))
        }
        Commands::Validate { registry, schema } => {
            let registry = load_registry(registry)?;
            let schema = config.load_schema(schema.as_deref())?;
            let operators = config.operator_registry()?;

            let failures: Vec<String> = registry
                .iter()
                .filter_map(|s| {
                    validate_with(&s.filter, &schema, &operators)
                        .err()
                        .map(|e| format!("{}: {}", s.name, e))
                })
                .collect();
            if !failures.is_empty() {
                bail!(
                    "{} of {} subdataset(s) invalid\n{}",
                    failures.len(),
                    registry.len(),
                    failures.join("\n")
                );
            }
            Ok(Output::Text(format!(
                "{} subdataset(s) valid",
                registry.len()
            )))
        }
        Commands::Merge {
            registry,
            targets,
            name,
            mode,
            remove_sources,
        } => {
            let registry = load_registry(registry)?;
            let targets = split_list(targets);
            Output::json(&merge_in(
                &registry,
                &targets,
                name,
                *mode,
                *remove_sources,
            )?)
        }
        Commands::Negate { registry, name } => {
            Output::json(&negate_in(&load_registry(registry)?, name)?)
        }
        Commands::Reorder { registry, order } => {
            let order = split_list(order);
            Output::json(&load_registry(registry)?.reorder(&order))
        }
        Commands::Rename { registry, from, to } => {
            Output::json(&load_registry(registry)?.rename(from, to)?)
        }
        Commands::Remove { registry, name } => {
            let registry = load_registry(registry)?;
            if !registry.contains(name) {
                log::warn!("subdataset '{}' not found; nothing removed", name);
            }
            Output::json(&registry.remove(name))
        }
        Commands::Visibility {
            registry,
            name,
            all,
            visible,
        } => {
            let registry = load_registry(registry)?;
            let updated = match name {
                Some(name) if !*all => registry.set_visibility(name, *visible),
                _ => registry.set_all_visibility(*visible),
            };
            Output::json(&updated)
        }
        Commands::Groups {
            registry,
            whole_dataset,
        } => Output::json(&load_registry(registry)?.query_groups(whole_dataset.as_deref())),
        Commands::Enumerate { source, schema } => {
            let generated = enumerate(source)?;
            let registry = if schema.is_some() || config.schema.path.is_some() {
                let schema = config.load_schema(schema.as_deref())?;
                Registry::new()
                    .replace_all_validated(generated, &schema, &config.operator_registry()?)
                    .context("Generated subdatasets do not fit the schema")?
            } else {
                log::info!("no schema given, generated filters are not validated");
                Registry::new().replace_all(generated)?
            };
            Output::json(&registry)
        }
    }
}

fn enumerate(source: &EnumerateSource) -> Result<Vec<Subdataset>> {
    match source {
        EnumerateSource::Values { column, input } => {
            let text = read_input(input.as_deref())?;
            let values: ValuesInput =
                serde_json::from_str(&text).context("Invalid unique values input")?;
            Ok(from_unique_values(column, &Vec::from(values)))
        }
        EnumerateSource::Booleans { columns } => Ok(from_boolean_columns(&split_list(columns))),
        EnumerateSource::Topics {
            column,
            input,
            tags,
        } => {
            let text = read_input(input.as_deref())?;
            let topics: Vec<Topic> = serde_json::from_str(&text).context("Invalid topics input")?;
            match tags {
                Some(tags) => Ok(from_topic_tags(column, &topics, &split_list(tags))?),
                None => Ok(from_topics(column, &topics)),
            }
        }
    }
}

/// Load a registry from a JSON file
pub fn load_registry(path: &Path) -> Result<Registry> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read registry {}", path.display()))?;
    Registry::from_json(&content).with_context(|| format!("Invalid registry {}", path.display()))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

/// Write rendered output to a file, or to stdout
pub fn write_output(output: &Output, path: Option<&Path>, pretty: bool) -> Result<()> {
    let mut rendered = output.render(pretty)?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    match path {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parse_args_from;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::PathBuf;
    use subq_filter::FilterNode;
    use tempfile::TempDir;

    fn write_registry(dir: &TempDir) -> PathBuf {
        let registry = Registry::from_subdatasets(vec![
            Subdataset::new("Drama", FilterNode::equal_to("genre", "Drama")),
            Subdataset::new("Comedy", FilterNode::equal_to("genre", "Comedy")),
            Subdataset::new("Active", FilterNode::is_true("active")),
        ])
        .unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, registry.to_json().unwrap()).unwrap();
        path
    }

    fn run(args: &[&str]) -> Result<Output> {
        let cli = parse_args_from(std::iter::once("subq").chain(args.iter().copied())).unwrap();
        execute(&cli.command, &Config::default())
    }

    fn names(output: Output) -> Vec<String> {
        match output {
            Output::Json(value) => serde_json::from_value::<Registry>(value)
                .unwrap()
                .names()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            Output::Text(text) => panic!("expected JSON, got {text}"),
        }
    }

    #[test]
    fn test_operators() {
        let output = run(&["operators", "boolean"]).unwrap();
        assert_eq!(output, Output::Json(json!(["empty", "not_empty", "is_true"])));

        let unknown = run(&["operators", "colour"]).unwrap();
        assert_eq!(unknown, Output::Json(json!([])));
    }

    #[test]
    fn test_operators_honour_overrides() {
        let cli = parse_args_from(["subq", "operators", "boolean"]).unwrap();
        let mut config = Config::default();
        config
            .operators
            .insert("boolean".to_string(), vec![subq_filter::LeafOperator::IsTrue]);
        let output = execute(&cli.command, &config).unwrap();
        assert_eq!(output, Output::Json(json!(["is_true"])));
    }

    #[test]
    fn test_names() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("names.txt");
        fs::write(&input, "A\nB\n\nA\nA\n").unwrap();
        let output = run(&["names", input.to_str().unwrap()]).unwrap();
        assert_eq!(output, Output::Json(json!(["A", "B", "A (2)", "A (3)"])));
    }

    #[test]
    fn test_merge_and_negate() {
        let dir = TempDir::new().unwrap();
        let registry = write_registry(&dir);
        let registry = registry.to_str().unwrap();

        let merged = run(&["merge", registry, "--targets", "Drama, Comedy", "--name", "Either"]).unwrap();
        assert_eq!(names(merged), vec!["Drama", "Comedy", "Active", "Either"]);

        let removed = run(&[
            "merge",
            registry,
            "--targets",
            "Drama,Comedy",
            "--name",
            "Both",
            "--mode",
            "intersection",
            "--remove-sources",
        ])
        .unwrap();
        assert_eq!(names(removed), vec!["Active", "Both"]);

        let negated = run(&["negate", registry, "--name", "Drama"]).unwrap();
        assert_eq!(names(negated), vec!["Drama", "Not Drama", "Comedy", "Active"]);

        assert!(run(&["merge", registry, "--targets", "Drama", "--name", "x"]).is_err());
        assert!(run(&["negate", registry, "--name", "Missing"]).is_err());
    }

    #[test]
    fn test_registry_edits() {
        let dir = TempDir::new().unwrap();
        let registry = write_registry(&dir);
        let registry = registry.to_str().unwrap();

        let reordered = run(&["reorder", registry, "--order", "Active,Drama,Nope"]).unwrap();
        assert_eq!(names(reordered), vec!["Active", "Drama"]);

        let renamed = run(&["rename", registry, "--from", "Drama", "--to", "Tragedy"]).unwrap();
        assert_eq!(names(renamed), vec!["Tragedy", "Comedy", "Active"]);
        assert!(run(&["rename", registry, "--from", "Drama", "--to", "Comedy"]).is_err());

        let removed = run(&["remove", registry, "--name", "Comedy"]).unwrap();
        assert_eq!(names(removed), vec!["Drama", "Active"]);

        let hidden = run(&["visibility", registry, "--all", "--visible", "false"]).unwrap();
        let Output::Json(hidden) = hidden else {
            panic!("expected JSON")
        };
        assert!(hidden
            .as_array()
            .unwrap()
            .iter()
            .all(|s| s["visible"] == json!(false)));
    }

    #[test]
    fn test_groups() {
        let dir = TempDir::new().unwrap();
        let registry = write_registry(&dir);
        let registry = registry.to_str().unwrap();

        let Output::Json(groups) =
            run(&["groups", registry, "--whole-dataset", "Everything"]).unwrap()
        else {
            panic!("expected JSON")
        };
        let groups = groups.as_array().unwrap();
        assert_eq!(groups.len(), 4);
        assert_eq!(
            groups[3],
            json!({ "name": "Everything", "filter": null, "visible": true })
        );
    }

    #[test]
    fn test_validate() {
        let dir = TempDir::new().unwrap();
        let registry = write_registry(&dir);
        let schema = dir.path().join("schema.json");
        fs::write(&schema, r#"{"genre": "categorical", "active": "boolean"}"#).unwrap();

        let output = run(&[
            "validate",
            registry.to_str().unwrap(),
            "--schema",
            schema.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(output, Output::Text("3 subdataset(s) valid".to_string()));

        fs::write(&schema, r#"{"genre": "continuous"}"#).unwrap();
        let err = run(&[
            "validate",
            registry.to_str().unwrap(),
            "--schema",
            schema.to_str().unwrap(),
        ])
        .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("1 of 3 subdataset(s) invalid"));
        assert!(message.contains("Active: Invalid filter at $: unknown column 'active'"));
    }

    #[test]
    fn test_enumerate_values() {
        let dir = TempDir::new().unwrap();
        let wrapped = dir.path().join("values.json");
        fs::write(&wrapped, r#"{"values": [1, 2, 2, 3]}"#).unwrap();
        let output = run(&[
            "enumerate",
            "values",
            "--column",
            "rating",
            "--input",
            wrapped.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(names(output), vec!["1", "2", "2 (2)", "3"]);

        let bare = dir.path().join("bare.json");
        fs::write(&bare, r#"["A", "A", "A (2)"]"#).unwrap();
        let collision = run(&[
            "enumerate",
            "values",
            "--column",
            "label",
            "--input",
            bare.to_str().unwrap(),
        ]);
        assert!(collision.is_err());
    }

    #[test]
    fn test_enumerate_checks_column_types() {
        let dir = TempDir::new().unwrap();
        let schema = dir.path().join("schema.json");
        fs::write(
            &schema,
            r#"{"genre": "categorical", "labels": "multi_categorical", "active": "boolean"}"#,
        )
        .unwrap();
        let schema = schema.to_str().unwrap();

        let output = run(&["enumerate", "booleans", "--columns", "active", "--schema", schema]);
        assert_eq!(names(output.unwrap()), vec!["active"]);

        let err = run(&["enumerate", "booleans", "--columns", "active,genre", "--schema", schema])
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.starts_with("Generated subdatasets do not fit the schema"));
        assert!(message.contains("operator 'is_true' is not allowed on categorical column 'genre'"));

        let values = dir.path().join("values.json");
        fs::write(&values, r#"["x"]"#).unwrap();
        let err = run(&[
            "enumerate",
            "values",
            "--column",
            "labels",
            "--input",
            values.to_str().unwrap(),
            "--schema",
            schema,
        ])
        .unwrap_err();
        assert!(format!("{err:#}")
            .contains("operator 'equal_to' is not allowed on multi_categorical column 'labels'"));
    }

    #[test]
    fn test_enumerate_booleans_and_topics() {
        let output = run(&["enumerate", "booleans", "--columns", "A,B"]).unwrap();
        assert_eq!(names(output), vec!["A", "B"]);

        let dir = TempDir::new().unwrap();
        let topics = dir.path().join("topics.json");
        fs::write(
            &topics,
            r#"[
                {"id": 1, "tags": ["x"], "label": "first", "words": []},
                {"id": 2, "tags": null, "label": null, "words": [["rain", 0.4]]}
            ]"#,
        )
        .unwrap();
        let topics = topics.to_str().unwrap();

        let plain = run(&["enumerate", "topics", "--column", "topic", "--input", topics]).unwrap();
        assert_eq!(names(plain), vec!["first", "rain"]);

        let grouped = run(&[
            "enumerate", "topics", "--column", "topic", "--input", topics, "--tags", "x",
        ])
        .unwrap();
        assert_eq!(names(grouped), vec!["x", "Uncategorized Topics"]);

        assert!(run(&[
            "enumerate", "topics", "--column", "topic", "--input", topics, "--tags", " , ",
        ])
        .is_err());
    }

    #[test]
    fn test_render() {
        let output = Output::Json(json!({"a": 1}));
        assert_eq!(output.render(false).unwrap(), r#"{"a":1}"#);
        assert_eq!(output.render(true).unwrap(), "{\n  \"a\": 1\n}");
        assert_eq!(Output::Text("ok".into()).render(true).unwrap(), "ok");
    }
}
