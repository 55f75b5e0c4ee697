#![deny(missing_docs)]

//! # Never Detection
//!
//! An intersection of objects that declare the same property with incompatible types has no
//! inhabitants. Such intersections are rejected before any schema is emitted.

use super::{dereference_type, possible_root_types};
use crate::error::AppResult;
use crate::table::TypeTable;
use crate::types::{Type, TypeKind};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Returns true when the intersection of `members` can never be satisfied.
pub fn does_interface_evaluate_to_never<'a, I>(members: I, table: &TypeTable) -> AppResult<bool>
where
    I: IntoIterator<Item = &'a Type>,
{
    Ok(first_conflicting_property(members, table)?.is_some())
}

/// Returns the first property (in declaration order) whose occurrences across the intersected
/// objects disagree.
///
/// Strings are compatible with any string literal, but two different literals conflict. Any
/// other mix of kinds (e.g. `int32` and `string`) conflicts.
pub fn first_conflicting_property<'a, I>(members: I, table: &TypeTable) -> AppResult<Option<String>>
where
    I: IntoIterator<Item = &'a Type>,
{
    let mut roots = Vec::new();
    for member in members {
        roots.extend(possible_root_types(member, table)?);
    }

    let mut seen: IndexMap<&str, Vec<&Type>> = IndexMap::new();
    for root in &roots {
        if let Type::Object { properties } = root {
            for property in properties {
                let ty = dereference_type(&property.ty, table)?;
                seen.entry(property.name.as_str()).or_default().push(ty);
            }
        }
    }

    for (name, types) in seen {
        if conflicts(&types) {
            return Ok(Some(name.to_string()));
        }
    }
    Ok(None)
}

fn conflicts(types: &[&Type]) -> bool {
    let all_strings = types
        .iter()
        .all(|t| matches!(t, Type::String | Type::StringLiteral { .. }));

    if all_strings {
        let literals: BTreeSet<&str> = types
            .iter()
            .filter_map(|t| match t {
                Type::StringLiteral { value } => Some(value.as_str()),
                _ => None,
            })
            .collect();
        return literals.len() > 1;
    }

    let kinds: BTreeSet<TypeKind> = types.iter().map(|t| t.kind()).collect();
    kinds.len() > 1
}
