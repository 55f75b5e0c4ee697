#![deny(missing_docs)]

//! # Contractual Core
//!
//! Core library for turning API contracts into schemas and checking traffic against them.
//!
//! A [`Contract`] names its types in a [`TypeTable`]; the [`resolver`] flattens references,
//! unions and intersections into concrete shapes, and the projectors in [`oas`] and
//! [`json_schema`] emit OpenAPI 2, OpenAPI 3 and JSON Schema documents from them.

/// Shared error types.
pub mod error;

/// The structural type model.
pub mod types;

/// Named type registry.
pub mod table;

/// Reference / union / intersection resolution.
pub mod resolver;

/// Contract model and validation.
pub mod contract;

/// OpenAPI 2 and 3 projection.
pub mod oas;

/// JSON Schema draft-07 projection.
pub mod json_schema;

/// Runtime validation of recorded interactions.
pub mod validator;

/// Contract style rules.
pub mod lint;

pub use contract::Contract;
pub use error::{AppError, AppResult, Dialect, StructuralError, UnsupportedConstruct};
pub use json_schema::generate_json_schema_document;
pub use lint::{lint_contract, LintViolation};
pub use oas::{generate_openapi2_document, generate_openapi3_document, SchemaStrategy};
pub use resolver::{
    dereference_type, does_interface_evaluate_to_never, infer_discriminator, possible_root_types,
};
pub use table::{TypeTable, TypeTableBuilder};
pub use types::{ObjectProperty, Type};
pub use validator::{Interaction, ValidationReport, Validator};
