// src/commands/common.rs
//! Shared setup and error reporting for the subcommands.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use miette::Diagnostic;
use thiserror::Error;
use weft_identity::IdentifierRegistry;
use weft_types::{ConfigError, ModelError, TypeSystem, TypeSystemConfig, TypeSystemError};

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("could not read {}", .path.display())]
    #[diagnostic(code(E9001))]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}", .path.display())]
    #[diagnostic(code(E9002), help("see `weft config` for the accepted keys"))]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    TypeSystem(#[from] TypeSystemError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error("failed to encode output: {0}")]
    #[diagnostic(code(E9003))]
    Output(String),
}

/// Settings from `path`, or the defaults when no file was given.
pub fn load_config(path: Option<&Path>) -> Result<TypeSystemConfig, CliError> {
    let Some(path) = path else {
        return Ok(TypeSystemConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let config = TypeSystemConfig::from_toml_str(&text).map_err(|source| {
        CliError::ParseConfig {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

/// A type system with the builtin types, configured from `config_path`.
pub fn build_type_system(config_path: Option<&Path>) -> Result<TypeSystem, CliError> {
    let config = load_config(config_path)?;
    let mut registry = IdentifierRegistry::new();
    Ok(TypeSystem::new(&mut registry, config)?)
}

/// Print `err` as a diagnostic report and pick the exit code.
pub fn report(err: CliError) -> ExitCode {
    eprintln!("{:?}", miette::Report::new(err));
    ExitCode::FAILURE
}

/// Run `command`, reporting its error if it fails.
pub fn run(command: impl FnOnce() -> Result<(), CliError>) -> ExitCode {
    match command() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(err),
    }
}
