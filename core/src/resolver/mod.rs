#![deny(missing_docs)]

//! # Resolution Engine
//!
//! Graph walks over a [`Type`] and its [`TypeTable`]:
//!
//! - **dereference**: follow a chain of references to the first non-reference.
//! - **roots**: flatten references, unions and intersections into concrete types.
//! - **discriminator**: infer the tag property of a union of objects.
//! - **never**: detect intersections whose members can never agree.
//!
//! Every walk keeps track of the references it is currently inside, so a contract such as
//! `type A = B; type B = A` fails with [`StructuralError::ReferenceCycle`] instead of recursing
//! forever. Recursive *data* (`type Tree = { children: Tree[] }`) is fine: object properties and
//! array elements are never expanded here.

pub mod discriminator;
pub mod never;

pub use discriminator::infer_discriminator;
pub use never::{does_interface_evaluate_to_never, first_conflicting_property};

use crate::error::{AppResult, StructuralError};
use crate::table::TypeTable;
use crate::types::{ObjectProperty, Type};
use tracing::trace;

/// Follows `ty` through the table until a non-reference type is reached.
pub fn dereference_type<'a>(ty: &'a Type, table: &'a TypeTable) -> AppResult<&'a Type> {
    reference_chain(ty, table).map(|(_, target)| target)
}

/// Like [`dereference_type`], also returning the names hopped through, in order.
///
/// A non-reference input yields an empty chain.
pub fn reference_chain<'a>(
    ty: &'a Type,
    table: &'a TypeTable,
) -> AppResult<(Vec<&'a str>, &'a Type)> {
    let mut hops: Vec<&'a str> = Vec::new();
    let mut current = ty;
    while let Type::Reference { name } = current {
        if hops.contains(&name.as_str()) {
            let mut cycle: Vec<String> = hops.iter().map(|h| h.to_string()).collect();
            cycle.push(name.clone());
            return Err(StructuralError::ReferenceCycle(cycle).into());
        }
        trace!(reference = %name, "following reference");
        hops.push(name.as_str());
        current = table.lookup(name)?;
    }
    Ok((hops, current))
}

/// Expands `ty` into the concrete types a value of it may take.
///
/// - references are looked up and expanded;
/// - union members are expanded and concatenated (no deduplication);
/// - intersection members must all expand to objects, which are merged into a single object
///   whose properties are the members' properties concatenated in order.
pub fn possible_root_types(ty: &Type, table: &TypeTable) -> AppResult<Vec<Type>> {
    let mut path = Vec::new();
    expand(ty, table, &mut path)
}

fn expand(ty: &Type, table: &TypeTable, path: &mut Vec<String>) -> AppResult<Vec<Type>> {
    match ty {
        Type::Reference { name } => {
            if let Some(pos) = path.iter().position(|p| p == name) {
                let mut cycle = path[pos..].to_vec();
                cycle.push(name.clone());
                return Err(StructuralError::ReferenceCycle(cycle).into());
            }
            path.push(name.clone());
            let roots = expand(table.lookup(name)?, table, path)?;
            path.pop();
            Ok(roots)
        }
        Type::Union { types, .. } => {
            if types.is_empty() {
                return Err(StructuralError::EmptyMembers("union").into());
            }
            let mut roots = Vec::new();
            for member in types {
                roots.extend(expand(member, table, path)?);
            }
            Ok(roots)
        }
        Type::Intersection { types } => {
            if types.is_empty() {
                return Err(StructuralError::EmptyMembers("intersection").into());
            }
            let mut merged: Vec<ObjectProperty> = Vec::new();
            for member in types {
                for root in expand(member, table, path)? {
                    match root {
                        Type::Object { properties } => merged.extend(properties),
                        other => {
                            return Err(StructuralError::NonObjectIntersection(
                                other.kind().to_string(),
                            )
                            .into())
                        }
                    }
                }
            }
            Ok(vec![Type::Object { properties: merged }])
        }
        concrete => Ok(vec![concrete.clone()]),
    }
}
