use std::process;

use anyhow::Context;
use subq_cli::{execute, parse_args, validate_config, write_output, Config};
use subq_shared::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = parse_args();

    // Load configuration
    let mut config = Config::load()?;
    if let Some(config_path) = &cli.config {
        config
            .merge_file(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
    }
    config.apply_cli(&cli);
    validate_config(&config)?;

    // Set up logging
    setup_logging(&config);
    log::debug!("{}", subq_shared::BuildInfo::current());

    let output = execute(&cli.command, &config)?;
    write_output(&output, cli.output.as_deref(), config.output.pretty)
}

fn setup_logging(config: &Config) {
    let log_level = match config.debug.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
}
