use std::io;

use rustyline::error::ReadlineError;
use thiserror::Error;

use flowplan_config::ConfigError;
use flowplan_core::CoreError;

/// Failures surfaced by the planner services the shell drives.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that terminate the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Readline error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error("{0}")]
    Command(String),
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::Planner(err.into())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Planner(err.into())
    }
}
