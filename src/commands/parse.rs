// src/commands/parse.rs

use std::path::Path;
use std::process::ExitCode;

use super::common::{CliError, build_type_system, run};

/// Parse `text` and print the canonical form of the type reference.
pub fn parse_type(config: Option<&Path>, text: &str) -> ExitCode {
    run(|| {
        println!("{}", canonical(config, text)?);
        Ok(())
    })
}

pub fn canonical(config: Option<&Path>, text: &str) -> Result<String, CliError> {
    let ts = build_type_system(config)?;
    Ok(ts.parse_type_ref(text)?.to_string())
}
