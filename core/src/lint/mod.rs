#![deny(missing_docs)]

//! # Contract Linting
//!
//! Style rules that flag contracts which are valid but awkward for API consumers. Each rule
//! implements [`LintRule`] and reports [`LintViolation`]s; [`lint_contract`] runs every rule
//! that was not disabled.

pub mod paths;
pub mod responses;
pub mod unions;

use crate::contract::Contract;
use crate::error::AppResult;
use crate::table::TypeTable;
use crate::types::Type;
use serde::Serialize;
use tracing::debug;

/// A single finding of a lint rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintViolation {
    /// Name of the rule that fired.
    pub rule: &'static str,
    /// Where in the contract.
    pub location: String,
    /// Human readable explanation.
    pub message: String,
}

/// A lint rule over a whole contract.
pub trait LintRule {
    /// Kebab-case rule name, as accepted by `--disable`.
    fn name(&self) -> &'static str;

    /// Checks the contract.
    fn check(&self, contract: &Contract, table: &TypeTable) -> AppResult<Vec<LintViolation>>;

    /// Convenience constructor for this rule's violations.
    fn violation(&self, location: impl Into<String>, message: impl Into<String>) -> LintViolation
    where
        Self: Sized,
    {
        LintViolation {
            rule: self.name(),
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Every built-in rule, in reporting order.
pub fn all_rules() -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(unions::HasDiscriminator),
        Box::new(unions::NoInlineObjectsWithinUnions),
        Box::new(unions::NoNullableArrays),
        Box::new(responses::NoOmittableFieldsWithinResponseBodies),
        Box::new(paths::NoTrailingForwardSlash),
    ]
}

/// Runs every rule whose name is not listed in `disabled_rules`.
pub fn lint_contract(
    contract: &Contract,
    table: &TypeTable,
    disabled_rules: &[String],
) -> AppResult<Vec<LintViolation>> {
    let mut violations = Vec::new();
    for rule in all_rules() {
        if disabled_rules.iter().any(|d| d == rule.name()) {
            debug!(rule = rule.name(), "lint rule disabled");
            continue;
        }
        let found = rule.check(contract, table)?;
        debug!(rule = rule.name(), violations = found.len(), "lint rule finished");
        violations.extend(found);
    }
    Ok(violations)
}

/// Named types (as `type <Name>`) followed by every typed position of the contract.
pub(crate) fn type_positions<'a>(
    contract: &'a Contract,
    table: &'a TypeTable,
) -> Vec<(String, &'a Type)> {
    let mut positions: Vec<(String, &'a Type)> = table
        .iter()
        .map(|(name, def)| (format!("type {name}"), &def.ty))
        .collect();
    positions.extend(contract.typed_positions());
    positions
}

/// Every union nested anywhere in the contract, with the location of its enclosing position.
pub(crate) fn unions<'a>(
    contract: &'a Contract,
    table: &'a TypeTable,
) -> Vec<(String, &'a [Type], Option<&'a str>)> {
    let mut found = Vec::new();
    for (location, ty) in type_positions(contract, table) {
        ty.walk(&mut |t| {
            if let Type::Union {
                types,
                discriminator,
            } = t
            {
                found.push((location.clone(), types.as_slice(), discriminator.as_deref()));
            }
        });
    }
    found
}
