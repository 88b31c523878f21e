// src/commands/default.rs

use std::path::Path;
use std::process::ExitCode;

use weft_tree::ValueTreeRoot;

use super::common::{CliError, build_type_system, run};
use crate::cli::OutputFormat;

/// Print the default value of the type written as `text`.
pub fn print_default(config: Option<&Path>, text: &str, format: OutputFormat) -> ExitCode {
    run(|| {
        println!("{}", render_default(config, text, format)?);
        Ok(())
    })
}

pub fn render_default(
    config: Option<&Path>,
    text: &str,
    format: OutputFormat,
) -> Result<String, CliError> {
    let ts = build_type_system(config)?;
    let type_ref = ts.parse_type_ref(text)?;
    let tree = ValueTreeRoot::new(&ts, type_ref)?;
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(tree.value())
            .map_err(|err| CliError::Output(err.to_string())),
        OutputFormat::Debug => Ok(format!("{:#?}", tree.value())),
    }
}
