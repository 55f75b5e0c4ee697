#![deny(missing_docs)]

//! # OpenAPI 3
//!
//! OpenAPI 3.0 supports `nullable` and `oneOf`, so heterogeneous unions are projected as
//! `oneOf` with an optional `discriminator`. Parameters carry full schemas and query parameters
//! choose their `style` from the root types and the contract configuration.

use super::params::{parameter_roots, ParameterLocation, ParameterShape};
use super::strategy::SchemaStrategy;
use super::{info, insert_operation, operation_base, request_parameters, response_views, Located};
use crate::contract::{Contract, Endpoint, Parameter, QueryArraySerialization};
use crate::error::{AppResult, Dialect};
use crate::resolver::{dereference_type, infer_discriminator, possible_root_types};
use crate::table::TypeTable;
use crate::types::Type;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// Schema strategy for OpenAPI 3.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApi3Strategy;

impl SchemaStrategy for OpenApi3Strategy {
    fn dialect(&self) -> Dialect {
        Dialect::OpenApi3
    }

    fn ref_prefix(&self) -> &'static str {
        "#/components/schemas/"
    }

    fn mark_nullable(&self, schema: &mut Map<String, Value>) {
        schema.insert("nullable".into(), json!(true));
    }

    fn nullable_reference(&self, reference: Value) -> Value {
        match reference {
            Value::Object(mut map) => {
                map.insert("nullable".into(), json!(true));
                Value::Object(map)
            }
            other => other,
        }
    }

    fn heterogeneous_union(
        &self,
        members: &[&Type],
        discriminator: Option<&str>,
        table: &TypeTable,
        nullable: bool,
    ) -> AppResult<Value> {
        let one_of = members
            .iter()
            .map(|member| self.project(member, table, false))
            .collect::<AppResult<Vec<_>>>()?;

        let property = match discriminator {
            Some(declared) => Some(declared.to_string()),
            None => {
                let inferred = infer_discriminator(members.iter().copied(), table)?;
                if inferred.is_none() && all_objects(members, table)? {
                    warn!(
                        members = members.len(),
                        "union of objects has no unambiguous discriminator"
                    );
                }
                inferred
            }
        };

        let mut schema = Map::new();
        schema.insert("oneOf".into(), Value::Array(one_of));
        if let Some(property) = property {
            let mut discriminator = Map::new();
            discriminator.insert("propertyName".into(), json!(property));
            if let Some(mapping) = self.discriminator_mapping(members, &property, table)? {
                discriminator.insert("mapping".into(), Value::Object(mapping));
            }
            schema.insert("discriminator".into(), Value::Object(discriminator));
        }
        if nullable {
            self.mark_nullable(&mut schema);
        }
        Ok(Value::Object(schema))
    }
}

impl OpenApi3Strategy {
    /// Maps each discriminator value to the schema that carries it.
    ///
    /// Only produced when every member is a reference whose roots are all objects declaring
    /// `property` as a string literal, and no value points at two schemas.
    pub fn discriminator_mapping(
        &self,
        members: &[&Type],
        property: &str,
        table: &TypeTable,
    ) -> AppResult<Option<Map<String, Value>>> {
        let mut mapping = Map::new();
        for member in members {
            let Type::Reference { name } = member else {
                return Ok(None);
            };
            for root in possible_root_types(member, table)? {
                let Type::Object { properties } = &root else {
                    return Ok(None);
                };
                let Some(tag) = properties.iter().find(|p| p.name == property) else {
                    return Ok(None);
                };
                match dereference_type(&tag.ty, table)? {
                    Type::StringLiteral { value } => {
                        let target = json!(format!("{}{}", self.ref_prefix(), name));
                        match mapping.get(value.as_str()) {
                            Some(existing) if *existing != target => return Ok(None),
                            _ => {
                                mapping.insert(value.clone(), target);
                            }
                        }
                    }
                    _ => return Ok(None),
                }
            }
        }
        Ok(Some(mapping))
    }

    fn parameter(
        &self,
        position: ParameterLocation,
        param: &Parameter,
        location: &str,
        table: &TypeTable,
        query_arrays: QueryArraySerialization,
    ) -> AppResult<Value> {
        let is_query = position == ParameterLocation::Query;
        let roots = parameter_roots(&param.ty, table, Dialect::OpenApi3, location, is_query)?;
        let schema = self
            .project(&param.ty, table, false)
            .located(|| location.to_string())?;

        let mut parameter = Map::new();
        parameter.insert("name".into(), json!(param.name));
        parameter.insert("in".into(), json!(position.as_str()));
        if let Some(description) = &param.description {
            parameter.insert("description".into(), json!(description));
        }
        parameter.insert(
            "required".into(),
            json!(position == ParameterLocation::Path || !param.optional),
        );
        parameter.insert("schema".into(), schema);

        if is_query {
            match (ParameterShape::of(&roots), query_arrays) {
                (ParameterShape::Array, QueryArraySerialization::Ampersand) => {
                    parameter.insert("style".into(), json!("form"));
                    parameter.insert("explode".into(), json!(true));
                }
                (ParameterShape::Array, QueryArraySerialization::Comma) => {
                    parameter.insert("explode".into(), json!(false));
                }
                (ParameterShape::Object, _) => {
                    parameter.insert("style".into(), json!("deepObject"));
                    parameter.insert("explode".into(), json!(true));
                }
                (ParameterShape::Scalar, _) | (ParameterShape::Mixed, _) => {}
            }
        }
        Ok(Value::Object(parameter))
    }
}

fn all_objects(members: &[&Type], table: &TypeTable) -> AppResult<bool> {
    for member in members {
        let roots = possible_root_types(member, table)?;
        if !roots.iter().all(|r| matches!(r, Type::Object { .. })) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn json_content(schema: Value) -> Value {
    json!({ "application/json": { "schema": schema } })
}

/// Builds a complete OpenAPI 3.0 document for `contract`.
pub fn generate_openapi3_document(contract: &Contract, table: &TypeTable) -> AppResult<Value> {
    let strategy = OpenApi3Strategy;

    let mut paths = Map::new();
    for endpoint in &contract.endpoints {
        let operation = operation(&strategy, contract, endpoint, table)?;
        insert_operation(&mut paths, endpoint, operation);
    }

    let mut schemas = Map::new();
    for (name, def) in table.iter() {
        let mut schema = strategy
            .project(&def.ty, table, false)
            .located(|| format!("components.schemas.{name}"))?;
        if let (Some(description), Value::Object(map)) = (&def.description, &mut schema) {
            if !map.contains_key("$ref") {
                map.insert("description".into(), json!(description));
            }
        }
        schemas.insert(name.to_string(), schema);
    }

    let mut components = Map::new();
    components.insert("schemas".into(), Value::Object(schemas));

    let mut document = Map::new();
    document.insert("openapi".into(), json!("3.0.2"));
    document.insert("info".into(), info(contract));
    document.insert("paths".into(), Value::Object(paths));

    if let Some(security) = &contract.security {
        let mut scheme = Map::new();
        scheme.insert("type".into(), json!("apiKey"));
        scheme.insert("in".into(), json!("header"));
        scheme.insert("name".into(), json!(security.name));
        if let Some(description) = &security.description {
            scheme.insert("description".into(), json!(description));
        }
        components.insert(
            "securitySchemes".into(),
            json!({ "SecurityHeader": Value::Object(scheme) }),
        );
        document.insert("components".into(), Value::Object(components));
        document.insert("security".into(), json!([{ "SecurityHeader": [] }]));
    } else {
        document.insert("components".into(), Value::Object(components));
    }

    debug!(
        contract = %contract.name,
        endpoints = contract.endpoints.len(),
        schemas = table.len(),
        "generated OpenAPI 3 document"
    );
    Ok(Value::Object(document))
}

fn operation(
    strategy: &OpenApi3Strategy,
    contract: &Contract,
    endpoint: &Endpoint,
    table: &TypeTable,
) -> AppResult<Map<String, Value>> {
    let mut operation = operation_base(endpoint);
    let query_arrays = contract.config.query_array_serialization();

    let parameters = request_parameters(endpoint)
        .into_iter()
        .map(|(position, param, location)| {
            strategy.parameter(position, param, &location, table, query_arrays)
        })
        .collect::<AppResult<Vec<_>>>()?;
    if !parameters.is_empty() {
        operation.insert("parameters".into(), Value::Array(parameters));
    }

    if let Some(body) = endpoint.request.as_ref().and_then(|r| r.body.as_ref()) {
        let schema = strategy
            .project(&body.ty, table, false)
            .located(|| format!("endpoint {} request.body", endpoint.name))?;
        let mut request_body = Map::new();
        if let Some(description) = &body.description {
            request_body.insert("description".into(), json!(description));
        }
        request_body.insert("content".into(), json_content(schema));
        request_body.insert("required".into(), json!(true));
        operation.insert("requestBody".into(), Value::Object(request_body));
    }

    let mut responses = Map::new();
    for view in response_views(endpoint) {
        let mut response = Map::new();
        response.insert("description".into(), json!(view.description));
        if !view.headers.is_empty() {
            let mut headers = Map::new();
            for header in view.headers {
                let location = format!("{} headers.{}", view.location, header.name);
                parameter_roots(&header.ty, table, Dialect::OpenApi3, &location, false)?;
                let schema = strategy
                    .project(&header.ty, table, false)
                    .located(|| location.clone())?;
                let mut entry = Map::new();
                if let Some(description) = &header.description {
                    entry.insert("description".into(), json!(description));
                }
                entry.insert("required".into(), json!(!header.optional));
                entry.insert("schema".into(), schema);
                headers.insert(header.name.clone(), Value::Object(entry));
            }
            response.insert("headers".into(), Value::Object(headers));
        }
        if let Some(body) = view.body {
            let schema = strategy
                .project(&body.ty, table, false)
                .located(|| format!("{} body", view.location))?;
            response.insert("content".into(), json_content(schema));
        }
        responses.insert(view.key, Value::Object(response));
    }
    operation.insert("responses".into(), Value::Object(responses));

    Ok(operation)
}
