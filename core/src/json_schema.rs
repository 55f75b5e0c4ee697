#![deny(missing_docs)]

//! # JSON Schema Projection
//!
//! Projects types into JSON Schema draft-07. Unlike the OpenAPI dialects, JSON Schema has a
//! `null` type, so nullable values become `oneOf` alternatives and every union is expressible.
//!
//! The runtime validator compiles these schemas, so every named type is reachable under
//! `#/definitions/`.

use crate::contract::Contract;
use crate::error::{AppResult, StructuralError};
use crate::oas::strategy::{literal_enum, primitive_row};
use crate::table::TypeTable;
use crate::types::{ObjectProperty, Type};
use serde_json::{json, Map, Value};
use tracing::debug;

/// Meta-schema URI of draft-07.
pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Projects `ty` into a draft-07 schema.
///
/// References are checked against `table` and emitted as `#/definitions/<name>`.
pub fn project(ty: &Type, table: &TypeTable) -> AppResult<Value> {
    let schema = match ty {
        Type::Null => json!({ "type": "null" }),
        Type::Boolean | Type::String | Type::Float | Type::Double | Type::Int32 | Type::Int64 => {
            json!({ "type": json_type(ty) })
        }
        Type::Date => json!({ "type": "string", "format": "date" }),
        Type::DateTime => json!({ "type": "string", "format": "date-time" }),
        Type::BooleanLiteral { .. }
        | Type::StringLiteral { .. }
        | Type::FloatLiteral { .. }
        | Type::IntLiteral { .. } => {
            json!({ "type": json_type(ty), "const": ty.literal_value() })
        }
        Type::Object { properties } => object(properties, table)?,
        Type::Array { element_type } => {
            json!({ "type": "array", "items": project(element_type, table)? })
        }
        Type::Union { types, .. } => union(types, table)?,
        Type::Intersection { types } => {
            let members = types
                .iter()
                .map(|member| project(member, table))
                .collect::<AppResult<Vec<_>>>()?;
            json!({ "allOf": members })
        }
        Type::Reference { name } => {
            table.get(name)?;
            json!({ "$ref": format!("#/definitions/{name}") })
        }
    };
    Ok(schema)
}

fn json_type(ty: &Type) -> &'static str {
    primitive_row(ty).map(|row| row.json_type).unwrap_or("object")
}

fn object(properties: &[ObjectProperty], table: &TypeTable) -> AppResult<Value> {
    let mut props = Map::new();
    let mut required: Vec<Value> = Vec::new();
    for property in properties {
        let mut schema = project(&property.ty, table)?;
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
    Ok(Value::Object(schema))
}

fn union(members: &[Type], table: &TypeTable) -> AppResult<Value> {
    if members.is_empty() {
        return Err(StructuralError::EmptyMembers("union").into());
    }
    let (nulls, others): (Vec<&Type>, Vec<&Type>) =
        members.iter().partition(|member| matches!(member, Type::Null));

    let mut alternatives = Vec::new();
    if !nulls.is_empty() {
        alternatives.push(json!({ "type": "null" }));
    }
    match others.as_slice() {
        [] => {}
        [single] => alternatives.push(project(single, table)?),
        _ => match literal_enum(&others) {
            Some(mut schema) => {
                schema.remove("format");
                alternatives.push(Value::Object(schema));
            }
            None => {
                for member in &others {
                    alternatives.push(project(member, table)?);
                }
            }
        },
    }

    Ok(match alternatives.len() {
        1 => alternatives.remove(0),
        _ => json!({ "oneOf": alternatives }),
    })
}

/// Every named type of `table`, projected, with its description.
pub fn definitions(table: &TypeTable) -> AppResult<Map<String, Value>> {
    let mut definitions = Map::new();
    for (name, def) in table.iter() {
        let mut schema = project(&def.ty, table)?;
        if let (Some(description), Value::Object(map)) = (&def.description, &mut schema) {
            if !map.contains_key("$ref") {
                map.insert("description".into(), json!(description));
            }
        }
        definitions.insert(name.to_string(), schema);
    }
    Ok(definitions)
}

/// Builds a draft-07 document holding every named type of the contract.
pub fn generate_json_schema_document(contract: &Contract, table: &TypeTable) -> AppResult<Value> {
    let definitions = definitions(table)?;
    debug!(
        contract = %contract.name,
        definitions = definitions.len(),
        "generated JSON Schema document"
    );
    let mut document = Map::new();
    document.insert("$schema".into(), json!(DRAFT_07));
    document.insert("title".into(), json!(contract.name));
    if let Some(description) = &contract.description {
        document.insert("description".into(), json!(description));
    }
    document.insert("definitions".into(), Value::Object(definitions));
    Ok(Value::Object(document))
}
