#![deny(missing_docs)]

//! # Runtime Validator
//!
//! Checks a recorded HTTP exchange against the contract: the request must hit a declared
//! endpoint with well-formed parameters, headers and body, and the response must be one the
//! endpoint declares.
//!
//! Text inputs are first coerced according to the parameter's root types (see [`coerce`]) and
//! every value is then validated against its draft-07 projection with the `jsonschema` crate.

pub mod coerce;

use crate::contract::{Body, Contract, Endpoint, Parameter, QueryArraySerialization};
use crate::error::{AppError, AppResult};
use crate::json_schema::{definitions, project, DRAFT_07};
use crate::oas::params::ParameterShape;
use crate::resolver::possible_root_types;
use crate::table::TypeTable;
use crate::types::Type;
use coerce::{coerce, coerce_all, match_path};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::{debug, trace};

/// A recorded request and the response it received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// The request as sent.
    pub request: RecordedRequest,
    /// The response as received.
    pub response: RecordedResponse,
}

/// A recorded HTTP request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedRequest {
    /// HTTP method, any case.
    pub method: String,
    /// Path, optionally followed by `?query`.
    pub path: String,
    /// Header values by name.
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    /// JSON body, if one was sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// A recorded HTTP response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedResponse {
    /// Status code.
    pub status: u16,
    /// Header values by name.
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    /// JSON body, if one was returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl Interaction {
    /// Reads an interaction from a JSON or YAML file (by extension).
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&raw)?),
            _ => Ok(serde_json::from_str(&raw)?),
        }
    }
}

/// One way in which an interaction departs from the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Where the problem is (`request.queryParams.limit`, `response.body`, ...).
    pub location: String,
    /// What is wrong.
    pub message: String,
}

/// Outcome of validating an interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Name of the matched endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Every violation found, in check order.
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// True when no violation was found.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Validates interactions against one contract.
pub struct Validator<'a> {
    contract: &'a Contract,
    table: &'a TypeTable,
    definitions: Map<String, Value>,
}

impl<'a> Validator<'a> {
    /// Prepares a validator; every named type is projected once up front.
    pub fn new(contract: &'a Contract, table: &'a TypeTable) -> AppResult<Self> {
        Ok(Self {
            contract,
            table,
            definitions: definitions(table)?,
        })
    }

    /// Validates one interaction.
    ///
    /// Contract violations are reported in the returned [`ValidationReport`]; an `Err` means
    /// the contract itself could not be used.
    pub fn validate(&self, interaction: &Interaction) -> AppResult<ValidationReport> {
        let mut report = ValidationReport::default();
        let request = &interaction.request;
        let (path, query) = request
            .path
            .split_once('?')
            .unwrap_or((request.path.as_str(), ""));

        let Some((endpoint, captures)) = self.find_endpoint(&request.method, path)? else {
            report.violations.push(Violation {
                location: "request".into(),
                message: format!("no endpoint matches {} {}", request.method, path),
            });
            return Ok(report);
        };
        debug!(endpoint = %endpoint.name, "matched endpoint");
        report.endpoint = Some(endpoint.name.clone());

        let mut violations = Vec::new();
        self.check_request(endpoint, &captures, query, request, &mut violations)?;
        self.check_response(endpoint, &interaction.response, &mut violations)?;
        report.violations = violations;
        Ok(report)
    }

    fn find_endpoint(
        &self,
        method: &str,
        path: &str,
    ) -> AppResult<Option<(&'a Endpoint, Vec<(String, String)>)>> {
        for endpoint in &self.contract.endpoints {
            if !endpoint.method.to_string().eq_ignore_ascii_case(method) {
                continue;
            }
            if let Some(captures) = match_path(&endpoint.path, path)? {
                return Ok(Some((endpoint, captures)));
            }
        }
        Ok(None)
    }

    fn check_request(
        &self,
        endpoint: &Endpoint,
        captures: &[(String, String)],
        query: &str,
        request: &RecordedRequest,
        violations: &mut Vec<Violation>,
    ) -> AppResult<()> {
        let Some(declared) = &endpoint.request else {
            return Ok(());
        };

        for param in &declared.path_params {
            let location = format!("request.pathParams.{}", param.name);
            let raw = captures
                .iter()
                .find(|(name, _)| name == &param.name)
                .map(|(_, value)| value.as_str());
            let value = match raw {
                Some(raw) => Some(coerce(raw, &possible_root_types(&param.ty, self.table)?)),
                None => None,
            };
            self.check_parameter(param, value, &location, violations)?;
        }

        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        for param in &declared.query_params {
            let location = format!("request.queryParams.{}", param.name);
            let value = self.query_value(param, &pairs)?;
            self.check_parameter(param, value, &location, violations)?;
        }

        self.check_headers(&declared.headers, &request.headers, "request", violations)?;
        self.check_body(declared.body.as_ref(), request.body.as_ref(), "request", violations)
    }

    fn check_response(
        &self,
        endpoint: &Endpoint,
        response: &RecordedResponse,
        violations: &mut Vec<Violation>,
    ) -> AppResult<()> {
        let declared = endpoint
            .responses
            .iter()
            .find(|r| r.status == response.status)
            .map(|r| (&r.headers, r.body.as_ref()))
            .or_else(|| {
                endpoint
                    .default_response
                    .as_ref()
                    .map(|d| (&d.headers, d.body.as_ref()))
            });
        let Some((headers, body)) = declared else {
            violations.push(Violation {
                location: "response".into(),
                message: format!("status {} is not declared", response.status),
            });
            return Ok(());
        };
        self.check_headers(headers, &response.headers, "response", violations)?;
        self.check_body(body, response.body.as_ref(), "response", violations)
    }

    fn check_headers(
        &self,
        declared: &[Parameter],
        actual: &IndexMap<String, String>,
        side: &str,
        violations: &mut Vec<Violation>,
    ) -> AppResult<()> {
        for header in declared {
            let location = format!("{side}.headers.{}", header.name);
            let raw = actual
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(&header.name))
                .map(|(_, value)| value.as_str());
            let value = match raw {
                Some(raw) => Some(self.coerce_text(&header.ty, raw)?),
                None => None,
            };
            self.check_parameter(header, value, &location, violations)?;
        }
        Ok(())
    }

    fn check_body(
        &self,
        declared: Option<&Body>,
        actual: Option<&Value>,
        side: &str,
        violations: &mut Vec<Violation>,
    ) -> AppResult<()> {
        let location = format!("{side}.body");
        match (declared, actual) {
            (Some(body), Some(value)) => self.check_schema(&body.ty, value, &location, violations),
            (Some(_), None) => {
                violations.push(Violation {
                    location,
                    message: "body is required".into(),
                });
                Ok(())
            }
            (None, _) => Ok(()),
        }
    }

    fn check_parameter(
        &self,
        param: &Parameter,
        value: Option<Value>,
        location: &str,
        violations: &mut Vec<Violation>,
    ) -> AppResult<()> {
        match value {
            Some(value) => self.check_schema(&param.ty, &value, location, violations),
            None if param.optional => Ok(()),
            None => {
                violations.push(Violation {
                    location: location.to_string(),
                    message: format!("missing required value '{}'", param.name),
                });
                Ok(())
            }
        }
    }

    /// Coerces a single text value; array types are split on commas.
    fn coerce_text(&self, ty: &Type, raw: &str) -> AppResult<Value> {
        let roots = possible_root_types(ty, self.table)?;
        match array_element(&roots) {
            Some(element) => {
                let elements = possible_root_types(element, self.table)?;
                Ok(coerce_all(raw.split(','), &elements))
            }
            None => Ok(coerce(raw, &roots)),
        }
    }

    fn query_value(
        &self,
        param: &Parameter,
        pairs: &[(String, String)],
    ) -> AppResult<Option<Value>> {
        let roots = possible_root_types(&param.ty, self.table)?;
        let values: Vec<&str> = pairs
            .iter()
            .filter(|(key, _)| key == &param.name)
            .map(|(_, value)| value.as_str())
            .collect();

        match ParameterShape::of(&roots) {
            ParameterShape::Array => {
                if values.is_empty() {
                    return Ok(None);
                }
                let element = array_element(&roots).map_or(Ok(Vec::new()), |element| {
                    possible_root_types(element, self.table)
                })?;
                let value = match self.contract.config.query_array_serialization() {
                    QueryArraySerialization::Ampersand => coerce_all(values, &element),
                    QueryArraySerialization::Comma => {
                        coerce_all(values.into_iter().flat_map(|v| v.split(',')), &element)
                    }
                };
                Ok(Some(value))
            }
            ParameterShape::Object => {
                let prefix = format!("{}[", param.name);
                let mut object = Map::new();
                for (key, value) in pairs {
                    let Some(field) = key.strip_prefix(&prefix).and_then(|k| k.strip_suffix(']'))
                    else {
                        continue;
                    };
                    let field_roots = match object_property(&roots, field) {
                        Some(ty) => possible_root_types(ty, self.table)?,
                        None => Vec::new(),
                    };
                    object.insert(field.to_string(), coerce(value, &field_roots));
                }
                Ok((!object.is_empty()).then_some(Value::Object(object)))
            }
            ParameterShape::Scalar | ParameterShape::Mixed => {
                Ok(values.first().map(|raw| coerce(raw, &roots)))
            }
        }
    }

    fn check_schema(
        &self,
        ty: &Type,
        instance: &Value,
        location: &str,
        violations: &mut Vec<Violation>,
    ) -> AppResult<()> {
        let schema = json!({
            "$schema": DRAFT_07,
            "allOf": [project(ty, self.table)?],
            "definitions": self.definitions,
        });
        let validator = jsonschema::draft7::new(&schema)
            .map_err(|e| AppError::General(format!("Invalid schema for {location}: {e}")))?;
        for error in validator.iter_errors(instance) {
            trace!(location, error = %error, "schema violation");
            violations.push(Violation {
                location: location.to_string(),
                message: error.to_string(),
            });
        }
        Ok(())
    }
}

fn array_element(roots: &[Type]) -> Option<&Type> {
    roots.iter().find_map(|root| match root {
        Type::Array { element_type } => Some(element_type.as_ref()),
        _ => None,
    })
}

fn object_property<'t>(roots: &'t [Type], field: &str) -> Option<&'t Type> {
    roots.iter().find_map(|root| match root {
        Type::Object { properties } => properties
            .iter()
            .find(|p| p.name == field)
            .map(|p| &p.ty),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = r#"
name: Pets
config:
  paramSerializationStrategy:
    query:
      array: comma
endpoints:
  - name: listPets
    method: GET
    path: /owners/:ownerId/pets
    request:
      pathParams:
        - name: ownerId
          type: { kind: int64 }
      queryParams:
        - name: limit
          optional: true
          type: { kind: int32 }
        - name: species
          optional: true
          type:
            kind: array
            elementType:
              kind: union
              types:
                - { kind: string-literal, value: cat }
                - { kind: string-literal, value: dog }
        - name: filter
          optional: true
          type:
            kind: object
            properties:
              - name: minAge
                type: { kind: int32 }
      headers:
        - name: X-Api-Key
          type: { kind: string }
    responses:
      - status: 200
        body:
          type: { kind: array, elementType: { kind: reference, name: Pet } }
    defaultResponse:
      body:
        type: { kind: reference, name: Error }
types:
  - name: Pet
    typeDef:
      type:
        kind: object
        properties:
          - name: name
            type: { kind: string }
          - name: tag
            optional: true
            type:
              kind: union
              types: [{ kind: string }, { kind: "null" }]
  - name: Error
    typeDef:
      type:
        kind: object
        properties:
          - name: message
            type: { kind: string }
"#;

    fn validate(raw: Value) -> ValidationReport {
        let contract = Contract::from_yaml_str(CONTRACT).unwrap();
        let table = contract.type_table().unwrap();
        let interaction: Interaction = serde_json::from_value(raw).unwrap();
        Validator::new(&contract, &table)
            .unwrap()
            .validate(&interaction)
            .unwrap()
    }

    #[test]
    fn test_conforming_interaction_has_no_violations() {
        let report = validate(json!({
            "request": {
                "method": "get",
                "path": "/owners/12/pets/?limit=5&species=cat,dog&filter[minAge]=2",
                "headers": {"x-api-key": "secret"}
            },
            "response": {
                "status": 200,
                "body": [{"name": "Rex", "tag": null}, {"name": "Tom"}]
            }
        }));
        assert_eq!(report.endpoint.as_deref(), Some("listPets"));
        assert!(report.is_valid(), "{:?}", report.violations);
    }

    #[test]
    fn test_unknown_route_is_reported() {
        let report = validate(json!({
            "request": {"method": "POST", "path": "/owners/12/pets"},
            "response": {"status": 200}
        }));
        assert_eq!(report.endpoint, None);
        assert_eq!(report.violations[0].location, "request");
    }

    #[test]
    fn test_parameter_violations() {
        let report = validate(json!({
            "request": {
                "method": "GET",
                "path": "/owners/abc/pets?limit=ten&species=cat,bird"
            },
            "response": {"status": 200, "body": []}
        }));
        let locations: Vec<&str> = report
            .violations
            .iter()
            .map(|v| v.location.as_str())
            .collect();
        assert!(locations.contains(&"request.pathParams.ownerId"));
        assert!(locations.contains(&"request.queryParams.limit"));
        assert!(locations.contains(&"request.queryParams.species"));
        assert!(locations.contains(&"request.headers.X-Api-Key"));
    }

    #[test]
    fn test_default_response_and_body_checks() {
        let report = validate(json!({
            "request": {
                "method": "GET",
                "path": "/owners/1/pets",
                "headers": {"X-API-KEY": "k"}
            },
            "response": {"status": 500, "body": {"code": 1}}
        }));
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].location, "response.body");
    }

    #[test]
    fn test_missing_body_is_reported() {
        let report = validate(json!({
            "request": {
                "method": "GET",
                "path": "/owners/1/pets",
                "headers": {"X-Api-Key": "k"}
            },
            "response": {"status": 200}
        }));
        assert_eq!(
            report.violations,
            vec![Violation {
                location: "response.body".into(),
                message: "body is required".into(),
            }]
        );
    }
}
