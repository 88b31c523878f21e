// src/bin/weft.rs

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::FormatTime;

use weft::cli::{Cli, Commands};
use weft::commands::compare::compare_types;
use weft::commands::config::print_config;
use weft::commands::default::print_default;
use weft::commands::parse::parse_type;

/// A timer that outputs nothing but still enables span timing calculation
struct NoTimestamp;

impl FormatTime for NoTimestamp {
    fn format_time(
        &self,
        _w: &mut tracing_subscriber::fmt::format::Writer<'_>,
    ) -> std::fmt::Result {
        Ok(())
    }
}

fn main() -> ExitCode {
    // WEFT_LOG_STYLE: "compact" (default) or "full" (with timestamps)
    if let Ok(filter) = EnvFilter::try_from_env("WEFT_LOG") {
        let style = std::env::var("WEFT_LOG_STYLE").unwrap_or_default();
        if style == "full" {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_level(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_writer(std::io::stderr)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_level(true)
                .with_timer(NoTimestamp)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(std::io::stderr)
                .init();
        }
        tracing::debug!("tracing initialized");
    }

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Parse { type_ref } => parse_type(config, &type_ref),
        Commands::Default { type_ref, format } => print_default(config, &type_ref, format),
        Commands::Compare { a, b } => compare_types(config, &a, &b),
        Commands::Config => print_config(config),
    }
}
