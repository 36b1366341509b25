mod config;

use std::{
    env, fs,
    io::{self, Read},
    process,
};

use config::{AppConfig, ConfigError};
use lexassign_application::{AssignmentProcessor, SeedSource};
use lexassign_infrastructure::{FixedSeedSource, OsSeedSource, PastedTableParser};
use lexassign_presentation::{ReportPresenter, format_assignment_error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Usage: lexassign <table-file | ->")]
    Usage,
    #[error("Failed to read '{path}': {source}")]
    Read { path: String, source: io::Error },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Solve(String),
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: &str) -> Result<String, CliError> {
    let read_err = |source| CliError::Read {
        path: path.to_string(),
        source,
    };
    if path == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .map_err(read_err)?;
        Ok(content)
    } else {
        fs::read_to_string(path).map_err(read_err)
    }
}

fn run() -> Result<(), CliError> {
    let Some(path) = env::args().nth(1) else {
        return Err(CliError::Usage);
    };
    let config = AppConfig::from_env()?;
    let content = read_input(&path)?;

    let fixed = config.seed.map(FixedSeedSource);
    let seeds: &dyn SeedSource = match &fixed {
        Some(fixed) => fixed,
        None => &OsSeedSource,
    };
    let processor =
        AssignmentProcessor::new(&PastedTableParser, seeds).with_backend(config.backend);
    tracing::debug!(?config, %path, "solving table");

    let report = processor
        .solve_text(&content, config.kind, config.mode)
        .map_err(|err| CliError::Solve(format_assignment_error(&err)))?;
    print!("{}", ReportPresenter::render(&report).to_text());
    Ok(())
}
