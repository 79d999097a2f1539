//! Command-line interface for subq
//!
//! This module defines the argument structure with clap. Every command that
//! changes a registry reads it from a JSON file and writes the new registry
//! to stdout or `--output`; the input file is never modified in place.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use subq_core::MergeMode;

/// subq - named dataset subsets built from typed filter expressions
#[derive(Parser, Debug)]
#[command(name = "subq")]
#[command(author, version, about)]
#[command(after_help = "EXAMPLES:\n  \
    # Union two subdatasets into a new one\n  \
    subq merge registry.json --targets Drama,Comedy --name Either\n\n  \
    # Add the complement of a subdataset\n  \
    subq negate registry.json --name Either -o registry.next.json\n\n  \
    # One subdataset per distinct value of a column\n  \
    subq enumerate values --column rating --input values.json\n\n  \
    # Check every filter against a column schema\n  \
    subq validate registry.json --schema schema.json")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (merged after the discovered one)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// Write compact JSON instead of pretty-printed
    #[arg(short, long, global = true)]
    pub compact: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the operators allowed on a column type
    #[command(after_help = "EXAMPLES:\n  \
        subq operators categorical\n  \
        subq operators multi_categorical")]
    Operators {
        /// Column type name, e.g. `continuous`
        column_type: String,
    },

    /// Disambiguate raw names, one per line
    Names {
        /// File with one name per line (stdin if not specified)
        input: Option<PathBuf>,
    },

    /// Validate every filter of a registry against a column schema
    Validate {
        /// Registry file
        registry: PathBuf,

        /// Column schema file (JSON object of column name to type)
        #[arg(long, value_name = "FILE")]
        schema: Option<PathBuf>,
    },

    /// Merge subdatasets into a new one
    #[command(after_help = "EXAMPLES:\n  \
        subq merge registry.json --targets a,b --name both --mode intersection\n  \
        subq merge registry.json --targets a,b --name a --remove-sources")]
    Merge {
        /// Registry file
        registry: PathBuf,

        /// Comma separated names of the subdatasets to merge
        #[arg(long, value_name = "NAMES")]
        targets: String,

        /// Name of the merged subdataset
        #[arg(long)]
        name: String,

        /// How filters are combined: union or intersection
        #[arg(long, default_value = "union")]
        mode: MergeMode,

        /// Drop the merged subdatasets afterwards
        #[arg(long)]
        remove_sources: bool,
    },

    /// Add the complement of a subdataset
    Negate {
        /// Registry file
        registry: PathBuf,

        /// Subdataset to negate
        #[arg(long)]
        name: String,
    },

    /// Put subdatasets in a new order, dropping those not listed
    Reorder {
        /// Registry file
        registry: PathBuf,

        /// Comma separated names in the new order
        #[arg(long, value_name = "NAMES")]
        order: String,
    },

    /// Rename a subdataset
    Rename {
        /// Registry file
        registry: PathBuf,

        /// Current name
        #[arg(long)]
        from: String,

        /// New name
        #[arg(long)]
        to: String,
    },

    /// Remove a subdataset
    Remove {
        /// Registry file
        registry: PathBuf,

        /// Subdataset to remove
        #[arg(long)]
        name: String,
    },

    /// Show or hide subdatasets
    Visibility {
        /// Registry file
        registry: PathBuf,

        /// Subdataset to change
        #[arg(long, required_unless_present = "all", conflicts_with = "all")]
        name: Option<String>,

        /// Change every subdataset
        #[arg(long)]
        all: bool,

        /// New visibility
        #[arg(long, default_value = "true", action = ArgAction::Set)]
        visible: bool,
    },

    /// Visible subdatasets in the form sent to query consumers
    Groups {
        /// Registry file
        registry: PathBuf,

        /// Append a whole-dataset group with this name
        #[arg(long, value_name = "NAME")]
        whole_dataset: Option<String>,
    },

    /// Generate a complete list of subdatasets
    Enumerate {
        #[command(subcommand)]
        source: EnumerateSource,

        /// Check generated filters against this column schema (defaults to schema.path)
        #[arg(long, value_name = "FILE", global = true)]
        schema: Option<PathBuf>,
    },
}

/// Inputs the enumeration generator can start from
#[derive(Subcommand, Debug)]
pub enum EnumerateSource {
    /// One subdataset per unique value of a column
    Values {
        /// Column the values belong to
        #[arg(long)]
        column: String,

        /// JSON file with `{"values": [...]}` or a bare array (stdin if not specified)
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// One subdataset per boolean column
    Booleans {
        /// Comma separated boolean column names
        #[arg(long, value_name = "NAMES")]
        columns: String,
    },

    /// One subdataset per topic, or per grouper tag
    Topics {
        /// Topic column
        #[arg(long)]
        column: String,

        /// JSON file with an array of topics (stdin if not specified)
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Comma separated grouper tags
        #[arg(long, value_name = "TAGS")]
        tags: Option<String>,
    },
}

/// Parse command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Parse command-line arguments from a vector (for testing)
pub fn parse_args_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
