//! Configuration management for subq
//!
//! Configuration is layered: built-in defaults, then the first config file
//! found in the standard locations, then an explicit `--config` file, then
//! `SUBQ_*` environment variables, and finally command-line flags.

use crate::cli::Cli;
use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use subq_filter::{ColumnType, LeafOperator, OperatorRegistry, Schema};
use subq_shared::Result;

const CONFIG_NAMES: [&str; 4] = ["subq.toml", ".subq.toml", "subq.yaml", ".subq.yaml"];

/// Main configuration structure for subq
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration
    pub output: OutputConfig,
    /// Debug and diagnostic configuration
    pub debug: DebugConfig,
    /// Column schema configuration
    pub schema: SchemaConfig,
    /// Per column type replacements of the allowed operator list, keyed by
    /// column type name
    pub operators: BTreeMap<String, Vec<LeafOperator>>,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Whether to pretty-print JSON
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Debug and diagnostic configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Verbosity level (0 = warn, 1 = info, 2 = debug, 3+ = trace)
    pub verbosity: u8,
}

/// Column schema configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Default schema file used by `validate` and `enumerate`
    pub path: Option<PathBuf>,
}

impl Config {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge_file(path)?;
        Ok(config)
    }

    /// Load configuration from the discovered file and the environment
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(config_path) = Self::find_config_file(None) {
            log::debug!("loading config from {}", config_path.display());
            config.merge_file(&config_path)?;
        }

        config.merge_env()?;

        Ok(config)
    }

    /// Find a configuration file in the standard locations
    pub(crate) fn find_config_file(current_dir: Option<&Path>) -> Option<PathBuf> {
        let current_dir = match current_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };

        let user_dir = dirs::config_dir().map(|dir| dir.join("subq"));
        std::iter::once(current_dir)
            .chain(user_dir)
            .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)))
            .find(|path| path.exists())
            .map(|path| path.canonicalize().unwrap_or(path))
    }

    /// Merge configuration from file
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let file_config: Config = match extension {
            "toml" => toml::from_str(&content).map_err(|e| anyhow!("Invalid TOML config: {e}"))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|e| anyhow!("Invalid YAML config: {e}"))?
            }
            _ => bail!("Unsupported config file format: {}", path.display()),
        };
        self.merge(file_config);
        Ok(())
    }

    /// Merge configuration from environment variables
    fn merge_env(&mut self) -> Result<()> {
        self.merge_env_with_reader(|key| std::env::var(key).ok())
    }

    /// Merge configuration from environment variables with custom reader
    fn merge_env_with_reader<F>(&mut self, env_reader: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // SUBQ_VERBOSITY
        if let Some(val) = env_reader("SUBQ_VERBOSITY") {
            self.debug.verbosity = val.parse().unwrap_or_else(|_| {
                log::warn!("ignoring invalid SUBQ_VERBOSITY '{}'", val);
                DebugConfig::default().verbosity
            });
        }

        // SUBQ_PRETTY
        if let Some(val) = env_reader("SUBQ_PRETTY") {
            self.output.pretty = val != "0" && val.to_lowercase() != "false";
        }

        // SUBQ_SCHEMA
        if let Some(val) = env_reader("SUBQ_SCHEMA") {
            self.schema.path = Some(PathBuf::from(val));
        }

        Ok(())
    }

    /// Merge another config into this one
    fn merge(&mut self, other: Config) {
        if !other.output.pretty {
            self.output.pretty = false;
        }
        if other.debug.verbosity != DebugConfig::default().verbosity {
            self.debug.verbosity = other.debug.verbosity;
        }
        if other.schema.path.is_some() {
            self.schema.path = other.schema.path;
        }
        self.operators.extend(other.operators);
    }

    /// Apply command-line flags, which take precedence over everything else
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.compact {
            self.output.pretty = false;
        }
        if cli.verbose > 0 {
            self.debug.verbosity = cli.verbose;
        }
    }

    /// Operator table with the configured overrides applied
    pub fn operator_registry(&self) -> Result<OperatorRegistry> {
        self.operators
            .iter()
            .try_fold(OperatorRegistry::new(), |registry, (name, ops)| {
                let column_type: ColumnType = name.parse()?;
                Ok(registry.with_override(column_type, ops.iter().copied()))
            })
    }

    /// Load the column schema from `path`, or from the configured schema file
    pub fn load_schema(&self, path: Option<&Path>) -> Result<Schema> {
        let path = path
            .or(self.schema.path.as_deref())
            .ok_or_else(|| anyhow!("No schema given; pass --schema or set schema.path"))?;
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid schema file {}", path.display()))
    }

    /// Save configuration to a file, in the format given by its extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        let content = match extension {
            "toml" => toml::to_string_pretty(self)?,
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            _ => bail!("Unsupported config file format: {}", path.display()),
        };
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    for (column_type, ops) in &config.operators {
        column_type
            .parse::<ColumnType>()
            .with_context(|| format!("Invalid operator override for '{column_type}'"))?;
        let mut seen = BTreeSet::new();
        if let Some(op) = ops.iter().find(|op| !seen.insert(**op)) {
            bail!("Operator '{op}' listed twice for column type '{column_type}'");
        }
    }

    if let Some(path) = &config.schema.path {
        if !path.exists() {
            log::warn!("schema file does not exist: {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parse_args_from;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.output.pretty);
        assert_eq!(config.debug.verbosity, 0);
        assert_eq!(config.schema.path, None);
        assert!(config.operators.is_empty());
        assert!(!config.operator_registry().unwrap().is_customized());
    }

    #[test]
    fn test_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subq.toml");
        fs::write(
            &path,
            r#"
[output]
pretty = false

[debug]
verbosity = 2

[operators]
boolean = ["is_true", "empty"]
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert!(!config.output.pretty);
        assert_eq!(config.debug.verbosity, 2);

        let registry = config.operator_registry().unwrap();
        assert!(registry.permits(ColumnType::Boolean, LeafOperator::Empty));
        assert!(!registry.permits(ColumnType::Boolean, LeafOperator::NotEmpty));
        assert!(registry.permits(ColumnType::Textual, LeafOperator::HasText));
    }

    #[test]
    fn test_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".subq.yaml");
        fs::write(&path, "schema:\n  path: columns.json\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.schema.path, Some(PathBuf::from("columns.json")));
        assert!(config.output.pretty);
    }

    #[test]
    fn test_unsupported_and_invalid_files() {
        let dir = TempDir::new().unwrap();
        let ini = dir.path().join("subq.ini");
        fs::write(&ini, "pretty=false").unwrap();
        assert!(Config::load_from_file(&ini).is_err());

        let bad = dir.path().join("subq.toml");
        fs::write(&bad, "[operators]\nboolean = [\"bogus\"]\n").unwrap();
        assert!(Config::load_from_file(&bad).is_err());

        assert!(Config::load_from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_find_config_file_in_current_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".subq.toml"), "").unwrap();
        fs::write(dir.path().join("subq.yaml"), "").unwrap();

        let found = Config::find_config_file(Some(dir.path())).unwrap();
        assert_eq!(found.file_name().unwrap(), ".subq.toml");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SUBQ_VERBOSITY", "3"),
            ("SUBQ_PRETTY", "false"),
            ("SUBQ_SCHEMA", "/tmp/schema.json"),
        ]);
        let mut config = Config::default();
        config
            .merge_env_with_reader(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.debug.verbosity, 3);
        assert!(!config.output.pretty);
        assert_eq!(config.schema.path, Some(PathBuf::from("/tmp/schema.json")));

        let mut config = Config::default();
        config
            .merge_env_with_reader(|key| (key == "SUBQ_VERBOSITY").then(|| "loud".to_string()))
            .unwrap();
        assert_eq!(config.debug.verbosity, 0);
    }

    #[test]
    fn test_later_files_win() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.toml");
        let second = dir.path().join("b.yaml");
        fs::write(&first, "[debug]\nverbosity = 1\n[operators]\ntopic = [\"empty\"]\n").unwrap();
        fs::write(&second, "debug:\n  verbosity: 2\noperators:\n  topic: [equal_to]\n").unwrap();

        let mut config = Config::default();
        config.merge_file(&first).unwrap();
        config.merge_file(&second).unwrap();
        assert_eq!(config.debug.verbosity, 2);
        assert_eq!(
            config.operators.get("topic"),
            Some(&vec![LeafOperator::EqualTo])
        );
    }

    #[test]
    fn test_cli_flags_take_precedence() {
        let cli = parse_args_from(["subq", "-c", "-v", "operators", "boolean"]).unwrap();
        let mut config = Config::default();
        config.debug.verbosity = 3;
        config.apply_cli(&cli);
        assert!(!config.output.pretty);
        assert_eq!(config.debug.verbosity, 1);
    }

    #[test]
    fn test_validate_config_rejects_repeated_operator() {
        let mut config = Config::default();
        assert!(validate_config(&config).is_ok());

        config.operators.insert(
            "categorical".to_string(),
            vec![LeafOperator::EqualTo, LeafOperator::IsOneOf, LeafOperator::EqualTo],
        );
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("equal_to"));

        let mut config = Config::default();
        config
            .operators
            .insert("colour".to_string(), vec![LeafOperator::EqualTo]);
        assert!(validate_config(&config).is_err());
        assert!(config.operator_registry().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.output.pretty = false;
        config
            .operators
            .insert("boolean".to_string(), vec![LeafOperator::IsTrue]);

        for name in ["saved.toml", "saved.yaml"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::load_from_file(&path).unwrap(), config);
        }
        assert!(config.save(&dir.path().join("saved.txt")).is_err());
    }

    #[test]
    fn test_load_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, r#"{"genre": "categorical", "active": "boolean"}"#).unwrap();

        let mut config = Config::default();
        assert!(config.load_schema(None).is_err());

        config.schema.path = Some(path.clone());
        let schema = config.load_schema(None).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.columns_of_type(ColumnType::Boolean), vec!["active"]);
    }
}
