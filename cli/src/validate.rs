#![deny(missing_docs)]

//! # Validate Command
//!
//! Checks a recorded interaction against a contract and prints the report as JSON.

use contractual_core::{AppError, AppResult, Contract, Interaction, Validator};
use std::path::PathBuf;
use tracing::info;

/// Arguments for the validate command.
#[derive(clap::Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Path to the contract (JSON, or YAML by extension).
    #[clap(long, env = "CONTRACTUAL_CONTRACT")]
    pub contract: PathBuf,

    /// Path to the recorded interaction (JSON, or YAML by extension).
    #[clap(long, env = "CONTRACTUAL_INTERACTION")]
    pub interaction: PathBuf,
}

/// Executes the validation.
pub fn execute(args: &ValidateArgs) -> AppResult<()> {
    let contract = Contract::from_path(&args.contract)?;
    let table = contract.type_table()?;
    let interaction = Interaction::from_path(&args.interaction)?;

    let report = Validator::new(&contract, &table)?.validate(&interaction)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.is_valid() {
        info!(endpoint = ?report.endpoint, "interaction conforms");
        Ok(())
    } else {
        Err(AppError::General(format!(
            "{} contract violation(s)",
            report.violations.len()
        )))
    }
}
