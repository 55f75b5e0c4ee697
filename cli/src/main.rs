#![deny(missing_docs)]

//! # Contractual CLI
//!
//! Command Line Interface for the contractual toolchain.
//!
//! Supported Commands:
//! - `generate`: Contract -> OpenAPI 2 / OpenAPI 3 / JSON Schema document.
//! - `lint`: Reports style problems in a contract.
//! - `validate`: Checks a recorded interaction against a contract.

use clap::{Parser, Subcommand};
use contractual_core::AppResult;
use tracing_subscriber::EnvFilter;

mod generate;
mod lint;
mod output;
mod validate;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Contractual Toolchain CLI")]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG).
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generates an OpenAPI or JSON Schema document from a contract.
    Generate(generate::GenerateArgs),
    /// Lints a contract.
    Lint(lint::LintArgs),
    /// Validates a recorded request/response pair against a contract.
    Validate(validate::ValidateArgs),
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Ignore the error if a subscriber is already installed (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => generate::execute(args)?,
        Commands::Lint(args) => lint::execute(args)?,
        Commands::Validate(args) => validate::execute(args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_generate_flags() {
        let cli = Cli::parse_from([
            "contractual",
            "generate",
            "--contract",
            "api.yaml",
            "--language",
            "openapi3",
            "--format",
            "yaml",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.language, generate::Language::Openapi3);
                assert_eq!(args.format, output::Format::Yaml);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
