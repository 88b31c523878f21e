// src/commands/compare.rs

use std::path::Path;
use std::process::ExitCode;

use weft_types::SubtypeOrder;

use super::common::{CliError, build_type_system, run};

/// Print how the type `a` relates to the type `b`.
pub fn compare_types(config: Option<&Path>, a: &str, b: &str) -> ExitCode {
    run(|| {
        println!("{}", compare(config, a, b)?);
        Ok(())
    })
}

pub fn compare(config: Option<&Path>, a: &str, b: &str) -> Result<SubtypeOrder, CliError> {
    let ts = build_type_system(config)?;
    let a = ts.parse_type_ref(a)?;
    let b = ts.parse_type_ref(b)?;
    let order = ts.compare_subtype(&a, &b);
    tracing::debug!(%a, %b, %order, "compared");
    Ok(order)
}
