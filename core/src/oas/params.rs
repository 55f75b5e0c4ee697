#![deny(missing_docs)]

//! # Parameter Restrictions
//!
//! Path parameters, query parameters and headers travel as strings, so only a subset of types
//! can be used there. This module expands a parameter type to its root types and rejects the
//! ones no dialect can serialize.

use crate::error::{AppResult, Dialect, UnsupportedConstruct, UnsupportedReason};
use crate::resolver::possible_root_types;
use crate::table::TypeTable;
use crate::types::Type;

/// Where a non-body parameter travels (the OpenAPI `in` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    /// A `:name` segment of the path template.
    Path,
    /// A query string entry.
    Query,
    /// An HTTP header.
    Header,
}

impl ParameterLocation {
    /// The OpenAPI `in` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
        }
    }
}

/// Overall shape of a parameter, derived from its root types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterShape {
    /// Only scalar (or literal) roots.
    Scalar,
    /// At least one array root and no object roots.
    Array,
    /// At least one object root and no array roots.
    Object,
    /// Both array and object roots.
    Mixed,
}

impl ParameterShape {
    /// Classifies a list of root types.
    pub fn of(roots: &[Type]) -> Self {
        let arrays = roots.iter().any(|r| matches!(r, Type::Array { .. }));
        let objects = roots.iter().any(|r| matches!(r, Type::Object { .. }));
        match (arrays, objects) {
            (true, true) => ParameterShape::Mixed,
            (true, false) => ParameterShape::Array,
            (false, true) => ParameterShape::Object,
            (false, false) => ParameterShape::Scalar,
        }
    }
}

/// Expands a parameter type and checks every root against the parameter restrictions.
///
/// * `null` roots are rejected.
/// * object roots are rejected unless `allow_object` is set (query parameters in OpenAPI 3);
///   their property roots then follow the same rules, minus objects.
/// * array roots are allowed one level deep: element roots must be primitives or literals.
///
/// Returns the root types on success.
pub fn parameter_roots(
    ty: &Type,
    table: &TypeTable,
    dialect: Dialect,
    location: &str,
    allow_object: bool,
) -> AppResult<Vec<Type>> {
    let roots = possible_root_types(ty, table)?;
    for root in &roots {
        check_root(root, table, dialect, location, allow_object)?;
    }
    Ok(roots)
}

fn check_root(
    root: &Type,
    table: &TypeTable,
    dialect: Dialect,
    location: &str,
    allow_object: bool,
) -> AppResult<()> {
    let reject = |reason: UnsupportedReason| -> AppResult<()> {
        Err(UnsupportedConstruct::new(dialect, location, reason).into())
    };
    match root {
        Type::Null => reject(UnsupportedReason::NullParameter),
        Type::Object { properties } => {
            if !allow_object {
                return reject(UnsupportedReason::ObjectParameter);
            }
            for property in properties {
                let nested = format!("{location}.{}", property.name);
                parameter_roots(&property.ty, table, dialect, &nested, false)?;
            }
            Ok(())
        }
        Type::Array { element_type } => {
            let elements = possible_root_types(element_type, table)?;
            if elements.iter().all(Type::is_primitive) {
                Ok(())
            } else {
                reject(UnsupportedReason::NestedParameter)
            }
        }
        Type::Boolean
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
        | Type::DateTime => Ok(()),
        // Roots are always concrete.
        Type::Union { .. } | Type::Intersection { .. } | Type::Reference { .. } => Ok(()),
    }
}
