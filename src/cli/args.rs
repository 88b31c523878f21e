// src/cli/args.rs

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Inspect weft type references and their values
#[derive(Parser)]
#[command(name = "weft")]
#[command(version)]
#[command(about = "Structural types and value trees", long_about = None)]
pub struct Cli {
    /// TOML file with type system settings
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a type reference and print it in canonical form
    Parse {
        /// Type reference text, e.g. `Array<Int[0, 9, 0]>[0, -1, 1]`
        #[arg(value_name = "TYPE")]
        type_ref: String,
    },
    /// Print the default value of a type
    Default {
        #[arg(value_name = "TYPE")]
        type_ref: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Compare two types and print their subtype order
    Compare {
        #[arg(value_name = "A")]
        a: String,

        #[arg(value_name = "B")]
        b: String,
    },
    /// Print the effective type system settings as TOML
    Config,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Rust debug formatting
    Debug,
}
