#![deny(missing_docs)]

//! # Discriminator Inference
//!
//! Finds the property that tells the members of a union of objects apart, for unions whose
//! author did not declare one.

use super::{dereference_type, possible_root_types};
use crate::error::AppResult;
use crate::table::TypeTable;
use crate::types::Type;
use std::collections::{BTreeMap, BTreeSet};

/// Infers the discriminator property of a union with the given members.
///
/// Members are expanded to their root types and `null` roots are ignored. If every remaining
/// root is an object, a property qualifies when it is required, typed as a string literal in
/// every object, and no two objects share the same literal. Exactly one qualifying property is
/// returned; none or several yield `None`.
pub fn infer_discriminator<'a, I>(members: I, table: &TypeTable) -> AppResult<Option<String>>
where
    I: IntoIterator<Item = &'a Type>,
{
    let mut roots = Vec::new();
    for member in members {
        roots.extend(possible_root_types(member, table)?);
    }

    let mut objects = Vec::new();
    for root in &roots {
        match root {
            Type::Null => {}
            Type::Object { properties } => objects.push(properties),
            _ => return Ok(None),
        }
    }

    let mut literals: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for properties in &objects {
        for property in properties.iter().filter(|p| !p.optional) {
            if let Type::StringLiteral { value } = dereference_type(&property.ty, table)? {
                literals
                    .entry(property.name.as_str())
                    .or_default()
                    .insert(value.as_str());
            }
        }
    }

    let mut candidates = literals
        .into_iter()
        .filter(|(_, values)| values.len() == objects.len())
        .map(|(name, _)| name);

    match (candidates.next(), candidates.next()) {
        (Some(only), None) => Ok(Some(only.to_string())),
        _ => Ok(None),
    }
}
