//! distmpl CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Configuration error
//! - 4: Template error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use distmpl_core::CoreError;
use distmpl_templates::TemplateError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const CONFIGURATION_ERROR: u8 = 2;
    pub const TEMPLATE_ERROR: u8 = 4;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "distmpl=debug"
    } else if cli.quiet {
        "distmpl=warn"
    } else {
        "distmpl=info"
    };

    let mut filter = EnvFilter::from_default_env();
    for directive in [default_level, "warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    // Logging may already be initialized when embedded; keep going either way.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();

    let result = match cli.command {
        Commands::Build(args) => commands::build::execute(args),
        Commands::Plan(args) => commands::plan::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(categorize_error(&e))
        }
    }
}

/// Map an error to an exit code by walking its cause chain.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<TemplateError>() {
            return match err {
                TemplateError::Render { .. } => ExitCodes::TEMPLATE_ERROR,
                TemplateError::Configuration(_)
                | TemplateError::Toml(_)
                | TemplateError::Yaml(_) => ExitCodes::CONFIGURATION_ERROR,
                _ => ExitCodes::GENERAL_ERROR,
            };
        }
        if let Some(CoreError::FinderNotFound(_) | CoreError::InvalidPattern { .. }) =
            cause.downcast_ref::<CoreError>()
        {
            return ExitCodes::CONFIGURATION_ERROR;
        }
    }
    ExitCodes::GENERAL_ERROR
}
