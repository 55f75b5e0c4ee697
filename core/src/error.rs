#![deny(missing_docs)]

//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace, plus the two
//! typed failure families raised by the engine:
//!
//! - [`StructuralError`]: the contract handed to the engine is malformed (an upstream bug).
//! - [`UnsupportedConstruct`]: the contract is valid, but the requested dialect cannot express
//!   part of it.

use derive_more::{Display, From};
use std::fmt;

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// Wrapper for YAML (de)serialization errors.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// The type graph violates an invariant of the model.
    #[display("Structural Error: {_0}")]
    Structural(StructuralError),

    /// The target dialect cannot express a construct of the contract.
    #[display("Unsupported Construct: {_0}")]
    Unsupported(UnsupportedConstruct),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Violations of the type model invariants.
///
/// These indicate a defect in whatever produced the contract and are never retried.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// A union or intersection without member types.
    #[display("{_0} has no member types")]
    EmptyMembers(&'static str),

    /// A reference whose target is missing from the type table.
    #[display("reference to undefined type '{_0}'")]
    DanglingReference(String),

    /// A second definition registered under an existing name.
    #[display("duplicate type definition '{_0}'")]
    DuplicateType(String),

    /// An intersection member that does not resolve to an object.
    #[display("intersection member resolves to non-object type '{_0}'")]
    NonObjectIntersection(String),

    /// A chain of references that loops back onto itself.
    #[display("reference cycle: {}", _0.join(" -> "))]
    ReferenceCycle(Vec<String>),

    /// An intersection whose members disagree on a property type.
    #[display("intersection at {location} can never be satisfied (property '{property}')")]
    UnsatisfiableIntersection {
        /// Where the intersection was found.
        location: String,
        /// The first conflicting property name.
        property: String,
    },
}

impl std::error::Error for StructuralError {}

/// Output dialect a projector is producing.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// OpenAPI 2.0 (Swagger).
    #[display("OpenAPI 2")]
    OpenApi2,
    /// OpenAPI 3.0.x.
    #[display("OpenAPI 3")]
    OpenApi3,
    /// JSON Schema draft-07.
    #[display("JSON Schema")]
    JsonSchema,
}

/// Why a construct cannot be projected.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// `null` used on its own, outside of a union.
    #[display("null is only supported as a union member")]
    StandaloneNull,
    /// A union whose only members are `null`.
    #[display("a union cannot consist solely of null")]
    NullOnlyUnion,
    /// A union mixing kinds the dialect cannot express.
    #[display("heterogeneous unions are not supported")]
    HeterogeneousUnion,
    /// A parameter whose type can be `null`.
    #[display("null is not a valid parameter type")]
    NullParameter,
    /// A parameter whose type is an object.
    #[display("objects are not valid parameter types")]
    ObjectParameter,
    /// A parameter array whose elements are not primitives.
    #[display("parameter arrays must contain primitive elements")]
    NestedParameter,
}

/// A construct the target dialect cannot express, with the place it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedConstruct {
    /// Dialect being generated.
    pub dialect: Dialect,
    /// Human readable position of the construct.
    pub location: String,
    /// The reason it was rejected.
    pub reason: UnsupportedReason,
}

impl UnsupportedConstruct {
    /// Creates a new unsupported-construct error.
    pub fn new(dialect: Dialect, location: impl Into<String>, reason: UnsupportedReason) -> Self {
        Self {
            dialect,
            location: location.into(),
            reason,
        }
    }
}

impl fmt::Display for UnsupportedConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{}: {}", self.dialect, self.reason)
        } else {
            write!(f, "{}: {} ({})", self.dialect, self.reason, self.location)
        }
    }
}

impl std::error::Error for UnsupportedConstruct {}
