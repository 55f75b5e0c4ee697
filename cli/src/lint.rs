#![deny(missing_docs)]

//! # Lint Command
//!
//! Prints every lint violation of a contract and fails when there is at least one.

use contractual_core::{lint_contract, AppError, AppResult, Contract};
use std::path::PathBuf;

/// Arguments for the lint command.
#[derive(clap::Args, Debug, Clone)]
pub struct LintArgs {
    /// Path to the contract (JSON, or YAML by extension).
    #[clap(long, env = "CONTRACTUAL_CONTRACT")]
    pub contract: PathBuf,

    /// Rule to skip; may be repeated.
    #[clap(long = "disable", value_name = "RULE")]
    pub disabled: Vec<String>,
}

/// Executes the lint run.
pub fn execute(args: &LintArgs) -> AppResult<()> {
    let contract = Contract::from_path(&args.contract)?;
    let table = contract.type_table()?;
    let violations = lint_contract(&contract, &table, &args.disabled)?;

    for violation in &violations {
        println!(
            "[{}] {}: {}",
            violation.rule, violation.location, violation.message
        );
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::General(format!(
            "{} lint violation(s) in {:?}",
            violations.len(),
            args.contract
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const CONTRACT: &str = r#"{
        "name": "Slashes",
        "endpoints": [
            { "name": "list", "method": "GET", "path": "/items/", "responses": [] }
        ],
        "types": []
    }"#;

    #[test]
    fn test_lint_fails_on_violations() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contract.json");
        fs::write(&path, CONTRACT).unwrap();

        let args = LintArgs {
            contract: path,
            disabled: vec![],
        };
        let err = execute(&args).unwrap_err();
        assert!(err.to_string().contains("1 lint violation(s)"));
    }

    #[test]
    fn test_lint_passes_with_rule_disabled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contract.json");
        fs::write(&path, CONTRACT).unwrap();

        let args = LintArgs {
            contract: path,
            disabled: vec!["no-trailing-forward-slash".to_string()],
        };
        execute(&args).unwrap();
    }
}
