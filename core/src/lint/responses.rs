#![deny(missing_docs)]

//! # Response Body Rules
//!
//! Response bodies should not leave fields out.

use super::{LintRule, LintViolation};
use crate::contract::Contract;
use crate::error::AppResult;
use crate::table::TypeTable;
use crate::types::Type;
use std::collections::HashSet;

/// `no-omittable-fields-within-response-bodies`: response fields should be present, even if
/// `null`, so that clients can tell "absent" from "unknown".
pub struct NoOmittableFieldsWithinResponseBodies;

impl LintRule for NoOmittableFieldsWithinResponseBodies {
    fn name(&self) -> &'static str {
        "no-omittable-fields-within-response-bodies"
    }

    fn check(&self, contract: &Contract, table: &TypeTable) -> AppResult<Vec<LintViolation>> {
        let mut violations = Vec::new();
        for endpoint in &contract.endpoints {
            let mut bodies: Vec<(String, &Type)> = endpoint
                .responses
                .iter()
                .filter_map(|r| {
                    r.body.as_ref().map(|b| {
                        (format!("endpoint {} response {} body", endpoint.name, r.status), &b.ty)
                    })
                })
                .collect();
            if let Some(body) = endpoint.default_response.as_ref().and_then(|d| d.body.as_ref()) {
                bodies.push((format!("endpoint {} default response body", endpoint.name), &body.ty));
            }

            for (location, ty) in bodies {
                let mut optional = Vec::new();
                let mut visited = HashSet::new();
                collect_optional(ty, table, &mut visited, &mut optional)?;
                for field in optional {
                    violations.push(
                        self.violation(location.clone(), format!("field '{field}' is optional")),
                    );
                }
            }
        }
        Ok(violations)
    }
}

/// Collects the names of optional properties reachable from `ty`; each named type is entered once.
fn collect_optional<'a>(
    ty: &'a Type,
    table: &'a TypeTable,
    visited: &mut HashSet<&'a str>,
    out: &mut Vec<String>,
) -> AppResult<()> {
    match ty {
        Type::Reference { name } => {
            if visited.insert(name.as_str()) {
                collect_optional(table.lookup(name)?, table, visited, out)?;
            }
        }
        Type::Object { properties } => {
            for property in properties {
                if property.optional {
                    out.push(property.name.clone());
                }
                collect_optional(&property.ty, table, visited, out)?;
            }
        }
        Type::Array { element_type } => collect_optional(element_type, table, visited, out)?,
        Type::Union { types, .. } | Type::Intersection { types } => {
            for member in types {
                collect_optional(member, table, visited, out)?;
            }
        }
        Type::Null
        | Type::Boolean
        | Type::BooleanLiteral { .. }
        | Type::String
        | Type::StringLiteral { .. }
        | Type::Float
        | Type::Double
        | Type::FloatLiteral { .. }
        | Type::Int32
        | Type::Int64
        | Type::IntLiteral { .. }
        | Type::Date
        | Type::DateTime => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_found_through_references_once() {
        let contract = Contract::from_yaml_str(
            r#"
name: Tree
endpoints:
  - name: getTree
    method: GET
    path: /tree
    responses:
      - status: 200
        body:
          type: { kind: reference, name: Node }
    defaultResponse:
      body:
        type: { kind: object, properties: [] }
types:
  - name: Node
    typeDef:
      type:
        kind: object
        properties:
          - name: label
            optional: true
            type: { kind: string }
          - name: children
            type: { kind: array, elementType: { kind: reference, name: Node } }
"#,
        )
        .unwrap();
        let table = contract.type_table().unwrap();
        let found = NoOmittableFieldsWithinResponseBodies
            .check(&contract, &table)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location, "endpoint getTree response 200 body");
        assert_eq!(found[0].message, "field 'label' is optional");
    }
}
