#![deny(missing_docs)]

//! # Type Model
//!
//! The closed set of structural types a contract is described with.
//!
//! Types are plain owned trees. Named types live in the [`TypeTable`](crate::table::TypeTable)
//! and are pointed at with [`Type::Reference`]. Everything except `Union`, `Intersection` and
//! `Reference` is a *concrete* type: the resolution engine always bottoms out in those.
//!
//! The serialized form is internally tagged by `kind`:
//!
//! ```json
//! { "kind": "union", "types": [{ "kind": "string" }, { "kind": "null" }] }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// A structural type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Type {
    /// The `null` value.
    Null,
    /// Any boolean.
    Boolean,
    /// Exactly one boolean value.
    BooleanLiteral {
        /// The literal value.
        value: bool,
    },
    /// Any string.
    String,
    /// Exactly one string value.
    StringLiteral {
        /// The literal value.
        value: String,
    },
    /// Single precision number.
    Float,
    /// Double precision number.
    Double,
    /// Exactly one number value.
    FloatLiteral {
        /// The literal value.
        value: f64,
    },
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// Exactly one integer value.
    IntLiteral {
        /// The literal value.
        value: i64,
    },
    /// Calendar date (`2024-01-31`).
    Date,
    /// Date and time (`2024-01-31T10:00:00Z`).
    DateTime,
    /// An object with an ordered list of properties.
    Object {
        /// Properties in declaration order.
        #[serde(default)]
        properties: Vec<ObjectProperty>,
    },
    /// A homogeneous array.
    Array {
        /// Type of every element.
        #[serde(rename = "elementType")]
        element_type: Box<Type>,
    },
    /// One of several member types.
    Union {
        /// Members in declaration order.
        types: Vec<Type>,
        /// Author-declared discriminator property.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        discriminator: Option<String>,
    },
    /// All of several member types at once.
    Intersection {
        /// Members in declaration order.
        types: Vec<Type>,
    },
    /// A named type defined in the type table.
    Reference {
        /// Name of the target type.
        name: String,
    },
}

/// A single property of an [`Type::Object`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperty {
    /// Property name.
    pub name: String,
    /// Whether the property may be omitted.
    #[serde(default)]
    pub optional: bool,
    /// Optional documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Property type.
    #[serde(rename = "type")]
    pub ty: Type,
}

impl ObjectProperty {
    /// Creates a required property.
    pub fn required(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            optional: false,
            description: None,
            ty,
        }
    }

    /// Creates an optional property.
    pub fn optional(name: impl Into<String>, ty: Type) -> Self {
        Self {
            optional: true,
            ..Self::required(name, ty)
        }
    }

    /// Attaches a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The discriminant of a [`Type`], without payload.
///
/// Used wherever two types must be compared by kind only
/// (e.g. conflicting property types, uniform literal unions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
    /// See [`Type::Null`].
    Null,
    /// See [`Type::Boolean`].
    Boolean,
    /// See [`Type::BooleanLiteral`].
    BooleanLiteral,
    /// See [`Type::String`].
    String,
    /// See [`Type::StringLiteral`].
    StringLiteral,
    /// See [`Type::Float`].
    Float,
    /// See [`Type::Double`].
    Double,
    /// See [`Type::FloatLiteral`].
    FloatLiteral,
    /// See [`Type::Int32`].
    Int32,
    /// See [`Type::Int64`].
    Int64,
    /// See [`Type::IntLiteral`].
    IntLiteral,
    /// See [`Type::Date`].
    Date,
    /// See [`Type::DateTime`].
    DateTime,
    /// See [`Type::Object`].
    Object,
    /// See [`Type::Array`].
    Array,
    /// See [`Type::Union`].
    Union,
    /// See [`Type::Intersection`].
    Intersection,
    /// See [`Type::Reference`].
    Reference,
}

impl TypeKind {
    /// The serialized `kind` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Null => "null",
            TypeKind::Boolean => "boolean",
            TypeKind::BooleanLiteral => "boolean-literal",
            TypeKind::String => "string",
            TypeKind::StringLiteral => "string-literal",
            TypeKind::Float => "float",
            TypeKind::Double => "double",
            TypeKind::FloatLiteral => "float-literal",
            TypeKind::Int32 => "int32",
            TypeKind::Int64 => "int64",
            TypeKind::IntLiteral => "int-literal",
            TypeKind::Date => "date",
            TypeKind::DateTime => "date-time",
            TypeKind::Object => "object",
            TypeKind::Array => "array",
            TypeKind::Union => "union",
            TypeKind::Intersection => "intersection",
            TypeKind::Reference => "reference",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Type {
    /// `"value"` as a string literal type.
    pub fn string_literal(value: impl Into<String>) -> Self {
        Type::StringLiteral {
            value: value.into(),
        }
    }

    /// A boolean literal type.
    pub fn bool_literal(value: bool) -> Self {
        Type::BooleanLiteral { value }
    }

    /// A number literal type.
    pub fn float_literal(value: f64) -> Self {
        Type::FloatLiteral { value }
    }

    /// An integer literal type.
    pub fn int_literal(value: i64) -> Self {
        Type::IntLiteral { value }
    }

    /// An object type.
    pub fn object(properties: Vec<ObjectProperty>) -> Self {
        Type::Object { properties }
    }

    /// An array of `element`.
    pub fn array(element: Type) -> Self {
        Type::Array {
            element_type: Box::new(element),
        }
    }

    /// A union without a declared discriminator.
    pub fn union(types: Vec<Type>) -> Self {
        Type::Union {
            types,
            discriminator: None,
        }
    }

    /// A union with an author-declared discriminator property.
    pub fn discriminated_union(types: Vec<Type>, discriminator: impl Into<String>) -> Self {
        Type::Union {
            types,
            discriminator: Some(discriminator.into()),
        }
    }

    /// An intersection.
    pub fn intersection(types: Vec<Type>) -> Self {
        Type::Intersection { types }
    }

    /// A reference to the named type.
    pub fn reference(name: impl Into<String>) -> Self {
        Type::Reference { name: name.into() }
    }

    /// The payload-free kind of this type.
    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Null => TypeKind::Null,
            Type::Boolean => TypeKind::Boolean,
            Type::BooleanLiteral { .. } => TypeKind::BooleanLiteral,
            Type::String => TypeKind::String,
            Type::StringLiteral { .. } => TypeKind::StringLiteral,
            Type::Float => TypeKind::Float,
            Type::Double => TypeKind::Double,
            Type::FloatLiteral { .. } => TypeKind::FloatLiteral,
            Type::Int32 => TypeKind::Int32,
            Type::Int64 => TypeKind::Int64,
            Type::IntLiteral { .. } => TypeKind::IntLiteral,
            Type::Date => TypeKind::Date,
            Type::DateTime => TypeKind::DateTime,
            Type::Object { .. } => TypeKind::Object,
            Type::Array { .. } => TypeKind::Array,
            Type::Union { .. } => TypeKind::Union,
            Type::Intersection { .. } => TypeKind::Intersection,
            Type::Reference { .. } => TypeKind::Reference,
        }
    }

    /// True for every type the resolution engine may return.
    pub fn is_concrete(&self) -> bool {
        !matches!(
            self,
            Type::Union { .. } | Type::Intersection { .. } | Type::Reference { .. }
        )
    }

    /// True for scalar types (literals included) that fit in a parameter.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
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
                | Type::DateTime
        )
    }

    /// The literal value carried by a literal type, as JSON.
    pub fn literal_value(&self) -> Option<Value> {
        match self {
            Type::BooleanLiteral { value } => Some(json!(value)),
            Type::StringLiteral { value } => Some(json!(value)),
            Type::FloatLiteral { value } => Some(json!(value)),
            Type::IntLiteral { value } => Some(json!(value)),
            _ => None,
        }
    }

    /// The non-literal type a literal refines (`"a"` → `String`).
    ///
    /// Returns `None` for non-literal types.
    pub fn literal_base(&self) -> Option<Type> {
        match self {
            Type::BooleanLiteral { .. } => Some(Type::Boolean),
            Type::StringLiteral { .. } => Some(Type::String),
            Type::FloatLiteral { .. } => Some(Type::Float),
            Type::IntLiteral { .. } => Some(Type::Int32),
            _ => None,
        }
    }

    /// Visits this type and every nested type, depth first, parents before children.
    ///
    /// References are not followed.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Type)) {
        visit(self);
        match self {
            Type::Object { properties } => {
                for property in properties {
                    property.ty.walk(visit);
                }
            }
            Type::Array { element_type } => element_type.walk(visit),
            Type::Union { types, .. } | Type::Intersection { types } => {
                for member in types {
                    member.walk(visit);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged_union() {
        let raw = r#"{
            "kind": "union",
            "types": [
                { "kind": "string-literal", "value": "a" },
                { "kind": "null" },
                { "kind": "array", "elementType": { "kind": "date-time" } }
            ],
            "discriminator": "type"
        }"#;
        let ty: Type = serde_json::from_str(raw).unwrap();
        assert_eq!(
            ty,
            Type::discriminated_union(
                vec![
                    Type::string_literal("a"),
                    Type::Null,
                    Type::array(Type::DateTime)
                ],
                "type"
            )
        );
    }

    #[test]
    fn test_deserialize_object_defaults_optional() {
        let raw = r#"{
            "kind": "object",
            "properties": [
                { "name": "id", "type": { "kind": "int64" } },
                { "name": "nick", "optional": true, "description": "Nickname", "type": { "kind": "string" } }
            ]
        }"#;
        let ty: Type = serde_json::from_str(raw).unwrap();
        let Type::Object { properties } = ty else {
            panic!("expected object");
        };
        assert!(!properties[0].optional);
        assert!(properties[1].optional);
        assert_eq!(properties[1].description.as_deref(), Some("Nickname"));
    }

    #[test]
    fn test_kind_tags_round_trip_through_display() {
        assert_eq!(Type::Int32.kind().to_string(), "int32");
        assert_eq!(Type::DateTime.kind().to_string(), "date-time");
        assert_eq!(Type::bool_literal(true).kind().to_string(), "boolean-literal");
        assert_eq!(Type::reference("User").kind().to_string(), "reference");
    }

    #[test]
    fn test_concrete_and_primitive_classification() {
        assert!(Type::Null.is_concrete());
        assert!(!Type::Null.is_primitive());
        assert!(Type::object(vec![]).is_concrete());
        assert!(!Type::union(vec![Type::String]).is_concrete());
        assert!(!Type::reference("A").is_concrete());
        assert!(Type::Date.is_primitive());
        assert!(Type::int_literal(3).is_primitive());
        assert!(!Type::array(Type::String).is_primitive());
    }

    #[test]
    fn test_literal_helpers() {
        assert_eq!(Type::string_literal("x").literal_value(), Some(json!("x")));
        assert_eq!(Type::int_literal(4).literal_base(), Some(Type::Int32));
        assert_eq!(Type::float_literal(1.5).literal_base(), Some(Type::Float));
        assert_eq!(Type::String.literal_value(), None);
    }

    #[test]
    fn test_walk_visits_nested_types_without_following_references() {
        let ty = Type::object(vec![
            ObjectProperty::required("tags", Type::array(Type::String)),
            ObjectProperty::optional(
                "owner",
                Type::union(vec![Type::reference("User"), Type::Null]),
            ),
        ]);
        let mut kinds = Vec::new();
        ty.walk(&mut |t| kinds.push(t.kind()));
        assert_eq!(
            kinds,
            vec![
                TypeKind::Object,
                TypeKind::Array,
                TypeKind::String,
                TypeKind::Union,
                TypeKind::Reference,
                TypeKind::Null,
            ]
        );
    }
}
