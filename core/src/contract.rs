#![deny(missing_docs)]

//! # Contract
//!
//! The fully parsed description of one API, as produced by the source front end.
//!
//! Contracts are read from JSON or YAML. [`Contract::type_table`] freezes the named types into a
//! [`TypeTable`] and validates the whole contract against it, so every later stage can assume:
//!
//! - every reference resolves, and no union/intersection is empty;
//! - no chain of references loops back onto itself;
//! - every intersection can be satisfied.

use crate::error::{AppResult, StructuralError};
use crate::resolver::{first_conflicting_property, possible_root_types};
use crate::table::{TypeTable, TypeTableBuilder};
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// A parsed API contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    /// API name, used as the document title.
    pub name: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// API version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Generation settings.
    #[serde(default)]
    pub config: Config,
    /// API key header protecting every endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityHeader>,
    /// Endpoints in declaration order.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    /// Named types in declaration order.
    #[serde(default)]
    pub types: Vec<NamedType>,
}

/// Contract level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// How parameters are serialized on the wire.
    #[serde(default)]
    pub param_serialization_strategy: ParamSerializationStrategy,
}

impl Config {
    /// The configured serialization of array query parameters.
    pub fn query_array_serialization(&self) -> QueryArraySerialization {
        self.param_serialization_strategy.query.array
    }
}

/// Parameter serialization settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSerializationStrategy {
    /// Query parameter settings.
    #[serde(default)]
    pub query: QuerySerializationStrategy,
}

/// Query parameter serialization settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySerializationStrategy {
    /// Array query parameter encoding.
    #[serde(default)]
    pub array: QueryArraySerialization,
}

/// Encoding of array query parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryArraySerialization {
    /// `?id=1&id=2`
    #[default]
    Ampersand,
    /// `?id=1,2`
    Comma,
}

/// An API key header required by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityHeader {
    /// Header name.
    pub name: String,
    /// Header documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Header value type.
    #[serde(rename = "type")]
    pub ty: Type,
}

/// A named type entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedType {
    /// Type name.
    pub name: String,
    /// Type definition.
    pub type_def: TypeDefinition,
}

/// The definition part of a [`NamedType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// The type.
    #[serde(rename = "type")]
    pub ty: Type,
    /// Type documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Lowercase form used as an OpenAPI path item key.
    pub fn as_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key().to_uppercase())
    }
}

/// A single API operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Unique endpoint name (the `operationId`).
    pub name: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template with `:param` segments (e.g. `/users/:id`).
    pub path: String,
    /// Long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// One line summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Request definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
    /// Responses keyed by status, in declaration order.
    #[serde(default)]
    pub responses: Vec<Response>,
    /// Response for any undeclared status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_response: Option<DefaultResponse>,
}

/// The request half of an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Request headers.
    #[serde(default)]
    pub headers: Vec<Parameter>,
    /// Path parameters.
    #[serde(default)]
    pub path_params: Vec<Parameter>,
    /// Query parameters.
    #[serde(default)]
    pub query_params: Vec<Parameter>,
    /// JSON body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

/// A header, path parameter or query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Wire name.
    pub name: String,
    /// Documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value type.
    #[serde(rename = "type")]
    pub ty: Type,
    /// Whether it may be omitted. Path parameters are always required.
    #[serde(default)]
    pub optional: bool,
}

impl Parameter {
    /// Creates a required parameter.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            optional: false,
        }
    }

    /// Marks the parameter optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Body type.
    #[serde(rename = "type")]
    pub ty: Type,
    /// Documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A response for one status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status.
    pub status: u16,
    /// Documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Response headers.
    #[serde(default)]
    pub headers: Vec<Parameter>,
    /// JSON body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

/// The response used for any status not declared explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultResponse {
    /// Documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Response headers.
    #[serde(default)]
    pub headers: Vec<Parameter>,
    /// JSON body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

impl Contract {
    /// Parses a contract from JSON.
    pub fn from_json_str(raw: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parses a contract from YAML.
    pub fn from_yaml_str(raw: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Reads a contract file; `.yaml` / `.yml` are parsed as YAML, anything else as JSON.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let contract = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&raw)?,
            _ => Self::from_json_str(&raw)?,
        };
        debug!(
            contract = %contract.name,
            endpoints = contract.endpoints.len(),
            types = contract.types.len(),
            "contract loaded"
        );
        Ok(contract)
    }

    /// Builds the frozen type table and validates the contract against it.
    pub fn type_table(&self) -> AppResult<TypeTable> {
        let mut builder = TypeTableBuilder::new();
        for named in &self.types {
            builder.add(
                named.name.clone(),
                named.type_def.ty.clone(),
                named.type_def.description.clone(),
            )?;
        }
        let table = builder.build()?;
        self.validate(&table)?;
        debug!(contract = %self.name, types = table.len(), "type table built");
        Ok(table)
    }

    /// Checks every typed position of the contract against `table`.
    pub fn validate(&self, table: &TypeTable) -> AppResult<()> {
        for (name, def) in table.iter() {
            possible_root_types(&Type::reference(name), table)?;
            check_intersections(&format!("type {name}"), &def.ty, table)?;
        }
        for (location, ty) in self.typed_positions() {
            table.check_type(ty)?;
            check_intersections(&location, ty, table)?;
        }
        Ok(())
    }

    /// Every type used outside the type table (security, parameters, headers, bodies).
    pub fn typed_positions(&self) -> Vec<(String, &Type)> {
        let mut positions = Vec::new();
        if let Some(security) = &self.security {
            positions.push((format!("security header {}", security.name), &security.ty));
        }
        for endpoint in &self.endpoints {
            endpoint.collect_positions(&mut positions);
        }
        positions
    }
}

impl Endpoint {
    /// The path template in OpenAPI form (`/users/:id` → `/users/{id}`).
    pub fn oas_path(&self) -> String {
        self.path
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => format!("{{{name}}}"),
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Every body / parameter / header type of the endpoint, with its location.
    pub fn collect_positions<'a>(&'a self, out: &mut Vec<(String, &'a Type)>) {
        let prefix = format!("endpoint {}", self.name);
        if let Some(request) = &self.request {
            for header in &request.headers {
                out.push((format!("{prefix} request.headers.{}", header.name), &header.ty));
            }
            for param in &request.path_params {
                out.push((format!("{prefix} request.pathParams.{}", param.name), &param.ty));
            }
            for param in &request.query_params {
                out.push((format!("{prefix} request.queryParams.{}", param.name), &param.ty));
            }
            if let Some(body) = &request.body {
                out.push((format!("{prefix} request.body"), &body.ty));
            }
        }
        for response in &self.responses {
            for header in &response.headers {
                out.push((
                    format!("{prefix} response {} headers.{}", response.status, header.name),
                    &header.ty,
                ));
            }
            if let Some(body) = &response.body {
                out.push((format!("{prefix} response {} body", response.status), &body.ty));
            }
        }
        if let Some(default) = &self.default_response {
            for header in &default.headers {
                out.push((format!("{prefix} default response headers.{}", header.name), &header.ty));
            }
            if let Some(body) = &default.body {
                out.push((format!("{prefix} default response body"), &body.ty));
            }
        }
    }
}

fn check_intersections(location: &str, ty: &Type, table: &TypeTable) -> AppResult<()> {
    let mut intersections = Vec::new();
    ty.walk(&mut |t| {
        if let Type::Intersection { types } = t {
            intersections.push((t, types));
        }
    });
    for (intersection, members) in intersections {
        possible_root_types(intersection, table)?;
        if let Some(property) = first_conflicting_property(members, table)? {
            return Err(StructuralError::UnsatisfiableIntersection {
                location: location.to_string(),
                property,
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    const PETSTORE: &str = r#"
name: Petstore
version: 1.0.0
config:
  paramSerializationStrategy:
    query:
      array: comma
endpoints:
  - name: getPet
    method: GET
    path: /pets/:petId
    tags: [pets]
    request:
      pathParams:
        - name: petId
          type: { kind: int64 }
    responses:
      - status: 200
        body:
          type: { kind: reference, name: Pet }
types:
  - name: Pet
    typeDef:
      description: A pet
      type:
        kind: object
        properties:
          - name: id
            type: { kind: int64 }
"#;

    #[test]
    fn test_parse_yaml_contract() {
        let contract = Contract::from_yaml_str(PETSTORE).unwrap();
        assert_eq!(contract.name, "Petstore");
        assert_eq!(
            contract.config.query_array_serialization(),
            QueryArraySerialization::Comma
        );
        let endpoint = &contract.endpoints[0];
        assert_eq!(endpoint.method, HttpMethod::Get);
        assert_eq!(endpoint.oas_path(), "/pets/{petId}");
        assert_eq!(endpoint.responses[0].status, 200);

        let table = contract.type_table().unwrap();
        assert_eq!(table.get("Pet").unwrap().description.as_deref(), Some("A pet"));
    }

    #[test]
    fn test_config_defaults_to_ampersand() {
        let contract = Contract::from_json_str(r#"{"name":"Empty"}"#).unwrap();
        assert_eq!(
            contract.config.query_array_serialization(),
            QueryArraySerialization::Ampersand
        );
        assert!(contract.type_table().unwrap().is_empty());
    }

    #[test]
    fn test_dangling_reference_in_endpoint_is_rejected() {
        let mut contract = Contract::from_yaml_str(PETSTORE).unwrap();
        contract.types.clear();
        let err = contract.type_table().unwrap_err();
        assert!(matches!(
            err,
            AppError::Structural(StructuralError::DanglingReference(ref n)) if n == "Pet"
        ));
    }

    #[test]
    fn test_unsatisfiable_intersection_is_rejected_with_location() {
        let raw = r#"{
            "name": "Never",
            "types": [{
                "name": "Impossible",
                "typeDef": { "type": { "kind": "intersection", "types": [
                    { "kind": "object", "properties": [{ "name": "id", "type": { "kind": "int32" } }] },
                    { "kind": "object", "properties": [{ "name": "id", "type": { "kind": "string" } }] }
                ]}}
            }]
        }"#;
        let contract = Contract::from_json_str(raw).unwrap();
        match contract.type_table().unwrap_err() {
            AppError::Structural(StructuralError::UnsatisfiableIntersection {
                location,
                property,
            }) => {
                assert_eq!(location, "type Impossible");
                assert_eq!(property, "id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nested_non_object_intersection_is_rejected() {
        let raw = r#"{
            "name": "Nested",
            "types": [{
                "name": "Holder",
                "typeDef": { "type": { "kind": "object", "properties": [{
                    "name": "inner",
                    "type": { "kind": "intersection", "types": [
                        { "kind": "object", "properties": [] },
                        { "kind": "int32" }
                    ]}
                }]}}
            }]
        }"#;
        let contract = Contract::from_json_str(raw).unwrap();
        assert!(matches!(
            contract.type_table().unwrap_err(),
            AppError::Structural(StructuralError::NonObjectIntersection(ref kind)) if kind == "int32"
        ));
    }

    #[test]
    fn test_inline_body_non_object_intersection_is_rejected() {
        let contract = Contract::from_yaml_str(
            r#"
name: Inline
endpoints:
  - name: create
    method: POST
    path: /items
    request:
      body:
        type:
          kind: intersection
          types:
            - kind: object
              properties:
                - name: id
                  type: { kind: int64 }
            - kind: string
    responses: []
"#,
        )
        .unwrap();
        assert!(matches!(
            contract.type_table().unwrap_err(),
            AppError::Structural(StructuralError::NonObjectIntersection(ref kind)) if kind == "string"
        ));
    }

    #[test]
    fn test_reference_cycle_in_table_is_rejected() {
        let raw = r#"{
            "name": "Loop",
            "types": [
                { "name": "A", "typeDef": { "type": { "kind": "reference", "name": "B" } } },
                { "name": "B", "typeDef": { "type": { "kind": "reference", "name": "A" } } }
            ]
        }"#;
        let contract = Contract::from_json_str(raw).unwrap();
        assert!(matches!(
            contract.type_table().unwrap_err(),
            AppError::Structural(StructuralError::ReferenceCycle(_))
        ));
    }

    #[test]
    fn test_typed_positions_carry_locations() {
        let contract = Contract::from_yaml_str(PETSTORE).unwrap();
        let locations: Vec<String> = contract
            .typed_positions()
            .into_iter()
            .map(|(location, _)| location)
            .collect();
        assert_eq!(
            locations,
            vec![
                "endpoint getPet request.pathParams.petId",
                "endpoint getPet response 200 body"
            ]
        );
    }
}
