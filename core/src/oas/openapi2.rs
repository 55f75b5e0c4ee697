#![deny(missing_docs)]

//! # OpenAPI 2 (Swagger)
//!
//! Swagger has neither `oneOf` nor a nullability keyword. Nullable schemas carry the
//! `x-nullable` vendor extension and unions that do not collapse to an enum are rejected.
//! Non-body parameters are rendered inline (`type`, `format`, `enum`, `items`).

use super::params::{parameter_roots, ParameterLocation};
use super::strategy::{literal_enum, primitive_row, PrimitiveRow, SchemaStrategy};
use super::{info, insert_operation, operation_base, request_parameters, response_views, Located};
use crate::contract::{Contract, Endpoint, QueryArraySerialization};
use crate::error::{AppResult, Dialect, UnsupportedReason};
use crate::resolver::possible_root_types;
use crate::table::TypeTable;
use crate::types::Type;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Schema strategy for Swagger 2.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApi2Strategy;

impl SchemaStrategy for OpenApi2Strategy {
    fn dialect(&self) -> Dialect {
        Dialect::OpenApi2
    }

    fn ref_prefix(&self) -> &'static str {
        "#/definitions/"
    }

    fn mark_nullable(&self, schema: &mut Map<String, Value>) {
        schema.insert("x-nullable".into(), json!(true));
    }

    fn nullable_reference(&self, reference: Value) -> Value {
        json!({ "allOf": [reference], "x-nullable": true })
    }

    fn heterogeneous_union(
        &self,
        _members: &[&Type],
        _discriminator: Option<&str>,
        _table: &TypeTable,
        _nullable: bool,
    ) -> AppResult<Value> {
        Err(self.unsupported(UnsupportedReason::HeterogeneousUnion))
    }
}

impl OpenApi2Strategy {
    /// Renders parameter root types inline, as Swagger requires outside of bodies.
    ///
    /// A single root renders its own row; several roots must be literals of one kind and collapse
    /// to an `enum`. Array roots render `items` from their element roots.
    pub fn inline_schema(
        &self,
        roots: &[Type],
        table: &TypeTable,
        collection_format: Option<&str>,
    ) -> AppResult<Map<String, Value>> {
        match roots {
            [Type::Array { element_type }] => {
                let elements = possible_root_types(element_type, table)?;
                let mut schema = Map::new();
                schema.insert("type".into(), json!("array"));
                schema.insert(
                    "items".into(),
                    Value::Object(self.inline_schema(&elements, table, None)?),
                );
                if let Some(format) = collection_format {
                    schema.insert("collectionFormat".into(), json!(format));
                }
                Ok(schema)
            }
            [single] => literal_enum(&[single])
                .or_else(|| primitive_row(single).map(PrimitiveRow::to_map))
                .ok_or_else(|| self.unsupported(UnsupportedReason::ObjectParameter)),
            _ => {
                let members: Vec<&Type> = roots.iter().collect();
                literal_enum(&members)
                    .ok_or_else(|| self.unsupported(UnsupportedReason::HeterogeneousUnion))
            }
        }
    }
}

/// Builds a complete Swagger 2.0 document for `contract`.
pub fn generate_openapi2_document(contract: &Contract, table: &TypeTable) -> AppResult<Value> {
    let strategy = OpenApi2Strategy;

    let mut paths = Map::new();
    for endpoint in &contract.endpoints {
        let operation = operation(&strategy, contract, endpoint, table)?;
        insert_operation(&mut paths, endpoint, operation);
    }

    let mut definitions = Map::new();
    for (name, def) in table.iter() {
        let mut schema = strategy
            .project(&def.ty, table, false)
            .located(|| format!("definitions.{name}"))?;
        if let (Some(description), Value::Object(map)) = (&def.description, &mut schema) {
            if !map.contains_key("$ref") {
                map.insert("description".into(), json!(description));
            }
        }
        definitions.insert(name.to_string(), schema);
    }

    let mut document = Map::new();
    document.insert("swagger".into(), json!("2.0"));
    document.insert("info".into(), info(contract));
    document.insert("consumes".into(), json!(["application/json"]));
    document.insert("produces".into(), json!(["application/json"]));
    document.insert("paths".into(), Value::Object(paths));
    document.insert("definitions".into(), Value::Object(definitions));
    if let Some(security) = &contract.security {
        let mut scheme = Map::new();
        scheme.insert("type".into(), json!("apiKey"));
        scheme.insert("in".into(), json!("header"));
        scheme.insert("name".into(), json!(security.name));
        if let Some(description) = &security.description {
            scheme.insert("description".into(), json!(description));
        }
        document.insert(
            "securityDefinitions".into(),
            json!({ "SecurityHeader": Value::Object(scheme) }),
        );
        document.insert("security".into(), json!([{ "SecurityHeader": [] }]));
    }

    debug!(
        contract = %contract.name,
        endpoints = contract.endpoints.len(),
        definitions = table.len(),
        "generated OpenAPI 2 document"
    );
    Ok(Value::Object(document))
}

fn operation(
    strategy: &OpenApi2Strategy,
    contract: &Contract,
    endpoint: &Endpoint,
    table: &TypeTable,
) -> AppResult<Map<String, Value>> {
    let mut operation = operation_base(endpoint);

    let collection_format = match contract.config.query_array_serialization() {
        QueryArraySerialization::Ampersand => "multi",
        QueryArraySerialization::Comma => "csv",
    };

    let mut parameters = Vec::new();
    for (position, param, location) in request_parameters(endpoint) {
        let roots = parameter_roots(&param.ty, table, Dialect::OpenApi2, &location, false)?;
        let format = match position {
            ParameterLocation::Query => Some(collection_format),
            ParameterLocation::Path | ParameterLocation::Header => None,
        };
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
        parameter.extend(
            strategy
                .inline_schema(&roots, table, format)
                .located(|| location.clone())?,
        );
        parameters.push(Value::Object(parameter));
    }

    if let Some(body) = endpoint.request.as_ref().and_then(|r| r.body.as_ref()) {
        let schema = strategy
            .project(&body.ty, table, false)
            .located(|| format!("endpoint {} request.body", endpoint.name))?;
        let mut parameter = Map::new();
        parameter.insert("name".into(), json!("body"));
        parameter.insert("in".into(), json!("body"));
        if let Some(description) = &body.description {
            parameter.insert("description".into(), json!(description));
        }
        parameter.insert("required".into(), json!(true));
        parameter.insert("schema".into(), schema);
        parameters.push(Value::Object(parameter));
    }

    if !parameters.is_empty() {
        operation.insert("parameters".into(), Value::Array(parameters));
    }

    let mut responses = Map::new();
    for view in response_views(endpoint) {
        let mut response = Map::new();
        response.insert("description".into(), json!(view.description));
        if let Some(body) = view.body {
            let schema = strategy
                .project(&body.ty, table, false)
                .located(|| format!("{} body", view.location))?;
            response.insert("schema".into(), schema);
        }
        if !view.headers.is_empty() {
            let mut headers = Map::new();
            for header in view.headers {
                let location = format!("{} headers.{}", view.location, header.name);
                let roots =
                    parameter_roots(&header.ty, table, Dialect::OpenApi2, &location, false)?;
                let mut schema = Map::new();
                if let Some(description) = &header.description {
                    schema.insert("description".into(), json!(description));
                }
                schema.extend(
                    strategy
                        .inline_schema(&roots, table, None)
                        .located(|| location.clone())?,
                );
                headers.insert(header.name.clone(), Value::Object(schema));
            }
            response.insert("headers".into(), Value::Object(headers));
        }
        responses.insert(view.key, Value::Object(response));
    }
    operation.insert("responses".into(), Value::Object(responses));

    Ok(operation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Contract;
    use crate::error::AppError;
    use crate::table::TypeTableBuilder;
    use crate::types::ObjectProperty;

    fn empty() -> TypeTable {
        TypeTableBuilder::new().build().unwrap()
    }

    #[test]
    fn test_nullable_string() {
        let ty = Type::union(vec![Type::String, Type::Null]);
        assert_eq!(
            OpenApi2Strategy.project(&ty, &empty(), false).unwrap(),
            json!({"type": "string", "x-nullable": true})
        );
    }

    #[test]
    fn test_literal_union_collapses_to_enum() {
        let ty = Type::union(vec![
            Type::string_literal("a"),
            Type::string_literal("b"),
            Type::string_literal("c"),
        ]);
        assert_eq!(
            OpenApi2Strategy.project(&ty, &empty(), false).unwrap(),
            json!({"type": "string", "enum": ["a", "b", "c"]})
        );
    }

    #[test]
    fn test_nullable_literal_union_appends_null() {
        let ty = Type::union(vec![Type::int_literal(1), Type::int_literal(2), Type::Null]);
        assert_eq!(
            OpenApi2Strategy.project(&ty, &empty(), false).unwrap(),
            json!({"type": "integer", "format": "int32", "enum": [1, 2, null], "x-nullable": true})
        );
    }

    #[test]
    fn test_heterogeneous_union_is_rejected() {
        let ty = Type::union(vec![Type::String, Type::Boolean]);
        let err = OpenApi2Strategy.project(&ty, &empty(), false).unwrap_err();
        assert!(matches!(
            err,
            AppError::Unsupported(ref c) if c.reason == UnsupportedReason::HeterogeneousUnion
        ));
    }

    #[test]
    fn test_nullable_reference_wraps_in_all_of() {
        let ty = Type::union(vec![Type::Null, Type::reference("Pet")]);
        let mut builder = TypeTableBuilder::new();
        builder.add("Pet", Type::object(vec![]), None).unwrap();
        let table = builder.build().unwrap();
        assert_eq!(
            OpenApi2Strategy.project(&ty, &table, false).unwrap(),
            json!({"allOf": [{"$ref": "#/definitions/Pet"}], "x-nullable": true})
        );
    }

    #[test]
    fn test_object_with_descriptions_and_required() {
        let ty = Type::object(vec![
            ObjectProperty::required("id", Type::Int64).with_description("Identifier"),
            ObjectProperty::optional("owner", Type::reference("User")).with_description("Ignored"),
        ]);
        let mut builder = TypeTableBuilder::new();
        builder.add("User", Type::object(vec![]), None).unwrap();
        let table = builder.build().unwrap();
        assert_eq!(
            OpenApi2Strategy.project(&ty, &table, false).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "integer", "format": "int64", "description": "Identifier"},
                    "owner": {"$ref": "#/definitions/User"}
                },
                "required": ["id"]
            })
        );
    }

    #[test]
    fn test_standalone_null_is_rejected() {
        let err = OpenApi2Strategy.project(&Type::Null, &empty(), false).unwrap_err();
        assert!(matches!(
            err,
            AppError::Unsupported(ref c) if c.reason == UnsupportedReason::StandaloneNull
        ));
    }

    #[test]
    fn test_document_with_query_array_and_body() {
        let contract = Contract::from_yaml_str(
            r#"
name: Shop
security:
  name: X-Api-Key
  type: { kind: string }
endpoints:
  - name: createOrder
    method: POST
    path: /orders/:shopId
    request:
      pathParams:
        - name: shopId
          type: { kind: int64 }
      queryParams:
        - name: tags
          optional: true
          type: { kind: array, elementType: { kind: string } }
      body:
        type: { kind: reference, name: Order }
    responses:
      - status: 201
        headers:
          - name: Location
            type: { kind: string }
types:
  - name: Order
    typeDef:
      description: An order
      type:
        kind: object
        properties:
          - name: id
            type: { kind: int64 }
"#,
        )
        .unwrap();
        let table = contract.type_table().unwrap();
        let document = generate_openapi2_document(&contract, &table).unwrap();

        assert_eq!(document["swagger"], json!("2.0"));
        assert_eq!(document["info"]["version"], json!("0.0.0"));
        let operation = &document["paths"]["/orders/{shopId}"]["post"];
        assert_eq!(operation["operationId"], json!("createOrder"));
        assert_eq!(
            operation["parameters"],
            json!([
                {"name": "shopId", "in": "path", "required": true, "type": "integer", "format": "int64"},
                {
                    "name": "tags", "in": "query", "required": false,
                    "type": "array", "items": {"type": "string"}, "collectionFormat": "multi"
                },
                {
                    "name": "body", "in": "body", "required": true,
                    "schema": {"$ref": "#/definitions/Order"}
                }
            ])
        );
        assert_eq!(
            operation["responses"]["201"],
            json!({"description": "201 response", "headers": {"Location": {"type": "string"}}})
        );
        assert_eq!(document["definitions"]["Order"]["description"], json!("An order"));
        assert_eq!(
            document["securityDefinitions"]["SecurityHeader"],
            json!({"type": "apiKey", "in": "header", "name": "X-Api-Key"})
        );
    }

    #[test]
    fn test_object_query_parameter_is_rejected_with_location() {
        let contract = Contract::from_yaml_str(
            r#"
name: Search
endpoints:
  - name: search
    method: GET
    path: /search
    request:
      queryParams:
        - name: filter
          type: { kind: object, properties: [] }
    responses: []
types: []
"#,
        )
        .unwrap();
        let table = contract.type_table().unwrap();
        let err = generate_openapi2_document(&contract, &table).unwrap_err();
        match err {
            AppError::Unsupported(construct) => {
                assert_eq!(construct.reason, UnsupportedReason::ObjectParameter);
                assert_eq!(construct.location, "endpoint search request.queryParams.filter");
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn test_comma_query_arrays_use_csv() {
        let contract = Contract::from_yaml_str(
            r#"
name: Search
config:
  paramSerializationStrategy:
    query:
      array: comma
endpoints:
  - name: search
    method: GET
    path: /search
    request:
      queryParams:
        - name: ids
          type: { kind: array, elementType: { kind: int32 } }
    responses: []
types: []
"#,
        )
        .unwrap();
        let table = contract.type_table().unwrap();
        let document = generate_openapi2_document(&contract, &table).unwrap();
        assert_eq!(
            document["paths"]["/search"]["get"]["parameters"][0],
            json!({
                "name": "ids", "in": "query", "required": true,
                "type": "array", "items": {"type": "integer", "format": "int32"},
                "collectionFormat": "csv"
            })
        );
    }
}
