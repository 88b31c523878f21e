// src/commands/config.rs

use std::path::Path;
use std::process::ExitCode;

use super::common::{CliError, load_config, run};

/// Print the settings that would be used, defaults filled in.
pub fn print_config(config: Option<&Path>) -> ExitCode {
    run(|| {
        let text = load_config(config)?
            .to_toml_string()
            .map_err(|err| CliError::Output(err.to_string()))?;
        print!("{text}");
        Ok(())
    })
}
