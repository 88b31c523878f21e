// src/cli/mod.rs

mod args;

pub use args::{Cli, Commands, OutputFormat};
