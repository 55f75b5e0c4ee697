#![deny(missing_docs)]

//! # Schema Strategy Trait
//!
//! Defines the interface a schema dialect implements to turn resolved types into schema objects.
//!
//! The shape of objects, arrays, literals and unions is the same in every OpenAPI dialect and is
//! provided here. Implementors only decide how nullability is spelled, where references point,
//! and whether heterogeneous unions can be expressed at all.

use crate::error::{
    AppError, AppResult, Dialect, StructuralError, UnsupportedConstruct, UnsupportedReason,
};
use crate::table::TypeTable;
use crate::types::{ObjectProperty, Type};
use serde_json::{json, Map, Value};

/// `type` / `format` pair of a scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveRow {
    /// JSON type name (`string`, `integer`, ...).
    pub json_type: &'static str,
    /// Optional `format` qualifier.
    pub format: Option<&'static str>,
}

impl PrimitiveRow {
    /// Renders the row as `{type, format?}`.
    pub fn to_map(self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("type".into(), json!(self.json_type));
        if let Some(format) = self.format {
            map.insert("format".into(), json!(format));
        }
        map
    }
}

/// The schema row of a scalar or literal type, `None` for everything else.
///
/// Literals share the row of the type they refine (`IntLiteral` renders as `int32`).
pub fn primitive_row(ty: &Type) -> Option<PrimitiveRow> {
    let (json_type, format) = match ty {
        Type::Boolean | Type::BooleanLiteral { .. } => ("boolean", None),
        Type::String | Type::StringLiteral { .. } => ("string", None),
        Type::Float | Type::FloatLiteral { .. } => ("number", Some("float")),
        Type::Double => ("number", Some("double")),
        Type::Int32 | Type::IntLiteral { .. } => ("integer", Some("int32")),
        Type::Int64 => ("integer", Some("int64")),
        Type::Date => ("string", Some("date")),
        Type::DateTime => ("string", Some("date-time")),
        Type::Null
        | Type::Object { .. }
        | Type::Array { .. }
        | Type::Union { .. }
        | Type::Intersection { .. }
        | Type::Reference { .. } => return None,
    };
    Some(PrimitiveRow { json_type, format })
}

/// Collapses members that are all literals of one kind into `{type, format?, enum}`.
///
/// Returns `None` when any member is not a literal or the literal kinds differ.
pub fn literal_enum(members: &[&Type]) -> Option<Map<String, Value>> {
    let first = members.first()?;
    let kind = first.kind();
    let mut values = Vec::with_capacity(members.len());
    for member in members {
        if member.kind() != kind {
            return None;
        }
        values.push(member.literal_value()?);
    }
    let mut schema = primitive_row(first)?.to_map();
    schema.insert("enum".into(), Value::Array(values));
    Some(schema)
}

/// A schema dialect.
///
/// All projection methods are pure: the same type and table always produce the same schema.
/// Errors raised for dialect limitations carry an empty location; callers attach one with
/// [`super::Located`].
pub trait SchemaStrategy {
    // --- Dialect hooks ---

    /// The dialect produced by this strategy.
    fn dialect(&self) -> Dialect;

    /// JSON pointer prefix of named schemas (e.g. `#/definitions/`).
    fn ref_prefix(&self) -> &'static str;

    /// Marks an inline schema as accepting `null`.
    fn mark_nullable(&self, schema: &mut Map<String, Value>);

    /// Wraps a `{"$ref": ...}` so that it also accepts `null`.
    fn nullable_reference(&self, reference: Value) -> Value;

    /// Projects a union of two or more non-null members that cannot be collapsed to an enum.
    ///
    /// # Arguments
    ///
    /// * `members` - The non-null members, in declaration order.
    /// * `discriminator` - The property name declared on the union, if any.
    /// * `nullable` - Whether the union also admits `null`.
    fn heterogeneous_union(
        &self,
        members: &[&Type],
        discriminator: Option<&str>,
        table: &TypeTable,
        nullable: bool,
    ) -> AppResult<Value>;

    // --- Shared projection ---

    /// Error for a construct the dialect cannot express.
    fn unsupported(&self, reason: UnsupportedReason) -> AppError {
        UnsupportedConstruct::new(self.dialect(), "", reason).into()
    }

    /// `{"$ref": "<prefix><name>"}`.
    fn reference(&self, name: &str) -> Value {
        json!({ "$ref": format!("{}{}", self.ref_prefix(), name) })
    }

    /// Projects `ty` into a schema object.
    ///
    /// `nullable` requests that the schema also admits `null`; unions containing `null` set it
    /// themselves.
    fn project(&self, ty: &Type, table: &TypeTable, nullable: bool) -> AppResult<Value> {
        let mut schema = match ty {
            Type::Null => return Err(self.unsupported(UnsupportedReason::StandaloneNull)),
            Type::Boolean
            | Type::String
            | Type::Float
            | Type::Double
            | Type::Int32
            | Type::Int64
            | Type::Date
            | Type::DateTime => primitive_row(ty).map(PrimitiveRow::to_map).unwrap_or_default(),
            Type::BooleanLiteral { .. }
            | Type::StringLiteral { .. }
            | Type::FloatLiteral { .. }
            | Type::IntLiteral { .. } => literal_enum(&[ty]).unwrap_or_default(),
            Type::Object { properties } => self.object_schema(properties, table)?,
            Type::Array { element_type } => {
                let mut schema = Map::new();
                schema.insert("type".into(), json!("array"));
                schema.insert("items".into(), self.project(element_type, table, false)?);
                schema
            }
            Type::Union {
                types,
                discriminator,
            } => return self.union_schema(types, discriminator.as_deref(), table, nullable),
            Type::Intersection { types } => {
                let members = types
                    .iter()
                    .map(|member| self.project(member, table, false))
                    .collect::<AppResult<Vec<_>>>()?;
                let mut schema = Map::new();
                schema.insert("allOf".into(), Value::Array(members));
                schema
            }
            Type::Reference { name } => {
                let reference = self.reference(name);
                return Ok(if nullable {
                    self.nullable_reference(reference)
                } else {
                    reference
                });
            }
        };

        if nullable {
            if let Some(Value::Array(values)) = schema.get_mut("enum") {
                values.push(Value::Null);
            }
            self.mark_nullable(&mut schema);
        }
        Ok(Value::Object(schema))
    }

    /// Projects an object's properties; `required` and `properties` are omitted when empty.
    fn object_schema(
        &self,
        properties: &[ObjectProperty],
        table: &TypeTable,
    ) -> AppResult<Map<String, Value>> {
        let mut props = Map::new();
        let mut required: Vec<Value> = Vec::new();
        for property in properties {
            let mut schema = self.project(&property.ty, table, false)?;
            if let (Some(description), Value::Object(map)) = (&property.description, &mut schema) {
                if !map.contains_key("$ref") {
                    map.insert("description".into(), json!(description));
                }
            }
            let name = json!(property.name);
            if !property.optional && !required.contains(&name) {
                required.push(name);
            }
            props.insert(property.name.clone(), schema);
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        if !props.is_empty() {
            schema.insert("properties".into(), Value::Object(props));
        }
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }
        Ok(schema)
    }

    /// Projects a union by splitting its raw members into `null` and the rest.
    fn union_schema(
        &self,
        members: &[Type],
        discriminator: Option<&str>,
        table: &TypeTable,
        nullable: bool,
    ) -> AppResult<Value> {
        if members.is_empty() {
            return Err(StructuralError::EmptyMembers("union").into());
        }
        let (nulls, others): (Vec<&Type>, Vec<&Type>) =
            members.iter().partition(|member| matches!(member, Type::Null));
        let nullable = nullable || !nulls.is_empty();

        match others.as_slice() {
            [] => Err(self.unsupported(UnsupportedReason::NullOnlyUnion)),
            [single] => self.project(single, table, nullable),
            _ => match literal_enum(&others) {
                Some(mut schema) => {
                    if nullable {
                        if let Some(Value::Array(values)) = schema.get_mut("enum") {
                            values.push(Value::Null);
                        }
                        self.mark_nullable(&mut schema);
                    }
                    Ok(Value::Object(schema))
                }
                None => self.heterogeneous_union(&others, discriminator, table, nullable),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_rows() {
        assert_eq!(
            primitive_row(&Type::Int64),
            Some(PrimitiveRow {
                json_type: "integer",
                format: Some("int64")
            })
        );
        assert_eq!(
            primitive_row(&Type::int_literal(3)),
            primitive_row(&Type::Int32)
        );
        assert_eq!(primitive_row(&Type::Null), None);
        assert_eq!(primitive_row(&Type::array(Type::String)), None);
    }

    #[test]
    fn test_literal_enum_requires_uniform_kind() {
        let a = Type::string_literal("a");
        let b = Type::string_literal("b");
        let one = Type::int_literal(1);
        assert_eq!(
            Value::Object(literal_enum(&[&a, &b]).unwrap()),
            json!({"type": "string", "enum": ["a", "b"]})
        );
        assert!(literal_enum(&[&a, &one]).is_none());
        assert!(literal_enum(&[&a, &Type::String]).is_none());
        assert!(literal_enum(&[]).is_none());
    }
}
