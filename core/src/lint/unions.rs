#![deny(missing_docs)]

//! # Union Rules
//!
//! Rules on how unions are tagged, which members they hold and whether arrays are nullable.

use super::{unions, LintRule, LintViolation};
use crate::contract::Contract;
use crate::error::AppResult;
use crate::resolver::{dereference_type, infer_discriminator, possible_root_types};
use crate::table::TypeTable;
use crate::types::Type;

/// `has-discriminator`: unions of several objects should be tagged.
pub struct HasDiscriminator;

impl LintRule for HasDiscriminator {
    fn name(&self) -> &'static str {
        "has-discriminator"
    }

    fn check(&self, contract: &Contract, table: &TypeTable) -> AppResult<Vec<LintViolation>> {
        let mut violations = Vec::new();
        for (location, members, discriminator) in unions(contract, table) {
            if discriminator.is_some() {
                continue;
            }
            let mut objects = 0;
            for member in members {
                objects += possible_root_types(member, table)?
                    .iter()
                    .filter(|root| matches!(root, Type::Object { .. }))
                    .count();
            }
            if objects >= 2 && infer_discriminator(members, table)?.is_none() {
                violations.push(self.violation(
                    location,
                    format!("union of {objects} objects has no discriminator"),
                ));
            }
        }
        Ok(violations)
    }
}

/// `no-inline-objects-within-unions`: union members should be named types.
pub struct NoInlineObjectsWithinUnions;

impl LintRule for NoInlineObjectsWithinUnions {
    fn name(&self) -> &'static str {
        "no-inline-objects-within-unions"
    }

    fn check(&self, contract: &Contract, table: &TypeTable) -> AppResult<Vec<LintViolation>> {
        let mut violations = Vec::new();
        for (location, members, _) in unions(contract, table) {
            for (index, member) in members.iter().enumerate() {
                if matches!(member, Type::Object { .. }) {
                    violations.push(self.violation(
                        location.clone(),
                        format!("union member {index} is an inline object"),
                    ));
                }
            }
        }
        Ok(violations)
    }
}

/// `no-nullable-arrays`: prefer an empty array over `null`.
pub struct NoNullableArrays;

impl LintRule for NoNullableArrays {
    fn name(&self) -> &'static str {
        "no-nullable-arrays"
    }

    fn check(&self, contract: &Contract, table: &TypeTable) -> AppResult<Vec<LintViolation>> {
        let mut violations = Vec::new();
        for (location, members, _) in unions(contract, table) {
            if !members.iter().any(|m| matches!(m, Type::Null)) {
                continue;
            }
            for member in members {
                if matches!(dereference_type(member, table)?, Type::Array { .. }) {
                    violations.push(self.violation(location.clone(), "array is nullable"));
                    break;
                }
            }
        }
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lint(rule: &dyn LintRule, raw: &str) -> Vec<LintViolation> {
        let contract = Contract::from_yaml_str(raw).unwrap();
        let table = contract.type_table().unwrap();
        rule.check(&contract, &table).unwrap()
    }

    const PETS: &str = r#"
name: Pets
types:
  - name: Cat
    typeDef:
      type:
        kind: object
        properties:
          - name: name
            type: { kind: string }
  - name: Dog
    typeDef:
      type:
        kind: object
        properties:
          - name: name
            type: { kind: string }
  - name: Pet
    typeDef:
      type:
        kind: union
        types:
          - { kind: reference, name: Cat }
          - { kind: reference, name: Dog }
          - kind: object
            properties: []
"#;

    #[test]
    fn test_untagged_object_union_is_flagged() {
        let found = lint(&HasDiscriminator, PETS);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location, "type Pet");
        assert_eq!(found[0].message, "union of 3 objects has no discriminator");
    }

    #[test]
    fn test_inline_object_member_is_flagged() {
        let found = lint(&NoInlineObjectsWithinUnions, PETS);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "union member 2 is an inline object");
    }

    #[test]
    fn test_referenced_nullable_array_is_flagged() {
        let found = lint(
            &NoNullableArrays,
            r#"
name: Lists
types:
  - name: Names
    typeDef:
      type: { kind: array, elementType: { kind: string } }
  - name: MaybeNames
    typeDef:
      type:
        kind: union
        types: [{ kind: reference, name: Names }, { kind: "null" }]
"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location, "type MaybeNames");
    }
}
