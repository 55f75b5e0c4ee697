#![deny(missing_docs)]

//! # Type Table
//!
//! The name-indexed registry backing [`Type::Reference`] resolution.
//!
//! A table goes through exactly two phases:
//!
//! 1. **Build**: a [`TypeTableBuilder`] is filled by a single owner. Inserting a name twice fails.
//! 2. **Frozen**: [`TypeTableBuilder::build`] checks every registered type and hands back an
//!    immutable [`TypeTable`], shared by reference with every downstream consumer.

use crate::error::{AppResult, StructuralError};
use crate::types::Type;
use indexmap::IndexMap;

/// A named type and its documentation.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    /// The type itself.
    pub ty: Type,
    /// Optional documentation.
    pub description: Option<String>,
}

/// Mutable, build-phase view of a [`TypeTable`].
#[derive(Debug, Default)]
pub struct TypeTableBuilder {
    entries: IndexMap<String, TypeDef>,
}

impl TypeTableBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named type.
    ///
    /// Fails with [`StructuralError::DuplicateType`] if the name is taken; the existing entry is
    /// left untouched.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        ty: Type,
        description: Option<String>,
    ) -> AppResult<&mut Self> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(StructuralError::DuplicateType(name).into());
        }
        self.entries.insert(name, TypeDef { ty, description });
        Ok(self)
    }

    /// Freezes the table.
    ///
    /// Every registered type is checked for dangling references and empty unions/intersections.
    pub fn build(self) -> AppResult<TypeTable> {
        let table = TypeTable {
            entries: self.entries,
        };
        for def in table.entries.values() {
            table.check_type(&def.ty)?;
        }
        Ok(table)
    }
}

/// Frozen, read-only registry of named types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeTable {
    entries: IndexMap<String, TypeDef>,
}

impl TypeTable {
    /// Looks a definition up by name.
    ///
    /// A miss means a reference escaped validation and is reported as
    /// [`StructuralError::DanglingReference`].
    pub fn get(&self, name: &str) -> AppResult<&TypeDef> {
        self.entries
            .get(name)
            .ok_or_else(|| StructuralError::DanglingReference(name.to_string()).into())
    }

    /// Shorthand for `get(name)?.ty`.
    pub fn lookup(&self, name: &str) -> AppResult<&Type> {
        self.get(name).map(|def| &def.ty)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDef)> {
        self.entries.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no type is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that every reference inside `ty` resolves and no union/intersection is empty.
    pub fn check_type(&self, ty: &Type) -> AppResult<()> {
        let mut failure: Option<StructuralError> = None;
        ty.walk(&mut |t| {
            if failure.is_some() {
                return;
            }
            match t {
                Type::Reference { name } if !self.contains(name) => {
                    failure = Some(StructuralError::DanglingReference(name.clone()));
                }
                Type::Union { types, .. } if types.is_empty() => {
                    failure = Some(StructuralError::EmptyMembers("union"));
                }
                Type::Intersection { types } if types.is_empty() => {
                    failure = Some(StructuralError::EmptyMembers("intersection"));
                }
                _ => {}
            }
        });
        match failure {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}
