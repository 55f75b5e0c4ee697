#![deny(missing_docs)]

//! # OpenAPI Projection
//!
//! Turns a contract and its type table into OpenAPI documents.
//!
//! - [`strategy`]: the [`SchemaStrategy`] trait and the shared schema shapes.
//! - [`params`]: restrictions on types used as parameters and headers.
//! - [`openapi2`] / [`openapi3`]: the two dialects and their document builders.

pub mod openapi2;
pub mod openapi3;
pub mod params;
pub mod strategy;

pub use openapi2::{generate_openapi2_document, OpenApi2Strategy};
pub use openapi3::{generate_openapi3_document, OpenApi3Strategy};
pub use strategy::{literal_enum, primitive_row, PrimitiveRow, SchemaStrategy};

use crate::contract::{Body, Contract, Endpoint, Parameter};
use crate::error::{AppError, AppResult};
use params::ParameterLocation;
use serde_json::{json, Map, Value};

/// Attaches a location to dialect errors raised without one.
pub trait Located {
    /// Fills in the location of an [`AppError::Unsupported`] whose location is still empty.
    fn located(self, location: impl FnOnce() -> String) -> Self;
}

impl<T> Located for AppResult<T> {
    fn located(self, location: impl FnOnce() -> String) -> Self {
        self.map_err(|err| match err {
            AppError::Unsupported(mut construct) if construct.location.is_empty() => {
                construct.location = location();
                AppError::Unsupported(construct)
            }
            other => other,
        })
    }
}

/// The `info` object shared by both dialects.
pub(crate) fn info(contract: &Contract) -> Value {
    let mut info = Map::new();
    info.insert("title".into(), json!(contract.name));
    if let Some(description) = &contract.description {
        info.insert("description".into(), json!(description));
    }
    info.insert(
        "version".into(),
        json!(contract.version.as_deref().unwrap_or("0.0.0")),
    );
    Value::Object(info)
}

/// `operationId`, `summary`, `description` and `tags` of an operation.
pub(crate) fn operation_base(endpoint: &Endpoint) -> Map<String, Value> {
    let mut operation = Map::new();
    operation.insert("operationId".into(), json!(endpoint.name));
    if let Some(summary) = &endpoint.summary {
        operation.insert("summary".into(), json!(summary));
    }
    if let Some(description) = &endpoint.description {
        operation.insert("description".into(), json!(description));
    }
    if !endpoint.tags.is_empty() {
        operation.insert("tags".into(), json!(endpoint.tags));
    }
    operation
}

/// A response description, falling back to `"<status> response"`.
pub(crate) fn response_description(description: Option<&str>, status: Option<u16>) -> String {
    match (description, status) {
        (Some(description), _) => description.to_string(),
        (None, Some(status)) => format!("{status} response"),
        (None, None) => "default response".to_string(),
    }
}

/// Non-body request parameters in emission order (path, query, header) with their locations.
pub(crate) fn request_parameters(
    endpoint: &Endpoint,
) -> Vec<(ParameterLocation, &Parameter, String)> {
    let Some(request) = &endpoint.request else {
        return Vec::new();
    };
    let groups = [
        (ParameterLocation::Path, "pathParams", &request.path_params),
        (ParameterLocation::Query, "queryParams", &request.query_params),
        (ParameterLocation::Header, "headers", &request.headers),
    ];
    let mut parameters = Vec::new();
    for (position, field, params) in groups {
        for param in params {
            let location = format!("endpoint {} request.{field}.{}", endpoint.name, param.name);
            parameters.push((position, param, location));
        }
    }
    parameters
}

/// A status-keyed or default response, normalised for emission.
pub(crate) struct ResponseView<'a> {
    /// Key in the `responses` map (`"200"` or `"default"`).
    pub key: String,
    pub description: String,
    pub headers: &'a [Parameter],
    pub body: Option<&'a Body>,
    /// Location prefix, e.g. `endpoint getPet response 200`.
    pub location: String,
}

/// Every response of the endpoint, status responses first.
pub(crate) fn response_views(endpoint: &Endpoint) -> Vec<ResponseView<'_>> {
    let mut views: Vec<ResponseView<'_>> = endpoint
        .responses
        .iter()
        .map(|response| ResponseView {
            key: response.status.to_string(),
            description: response_description(
                response.description.as_deref(),
                Some(response.status),
            ),
            headers: &response.headers,
            body: response.body.as_ref(),
            location: format!("endpoint {} response {}", endpoint.name, response.status),
        })
        .collect();
    if let Some(default) = &endpoint.default_response {
        views.push(ResponseView {
            key: "default".into(),
            description: response_description(default.description.as_deref(), None),
            headers: &default.headers,
            body: default.body.as_ref(),
            location: format!("endpoint {} default response", endpoint.name),
        });
    }
    views
}

/// Inserts `operation` under `paths[path][method]`.
pub(crate) fn insert_operation(
    paths: &mut Map<String, Value>,
    endpoint: &Endpoint,
    operation: Map<String, Value>,
) {
    let item = paths
        .entry(endpoint.oas_path())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(item) = item {
        item.insert(endpoint.method.as_key().into(), Value::Object(operation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Dialect, UnsupportedConstruct, UnsupportedReason};

    #[test]
    fn test_located_fills_only_empty_locations() {
        let bare: AppResult<()> = Err(UnsupportedConstruct::new(
            Dialect::OpenApi2,
            "",
            UnsupportedReason::StandaloneNull,
        )
        .into());
        let err = bare.located(|| "definitions.Nothing".into()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported Construct: OpenAPI 2: null is only supported as a union member (definitions.Nothing)"
        );

        let placed: AppResult<()> = Err(UnsupportedConstruct::new(
            Dialect::OpenApi2,
            "inner",
            UnsupportedReason::StandaloneNull,
        )
        .into());
        let err = placed.located(|| "outer".into()).unwrap_err();
        assert!(err.to_string().ends_with("(inner)"));
    }

    #[test]
    fn test_response_description_fallbacks() {
        assert_eq!(response_description(None, Some(404)), "404 response");
        assert_eq!(response_description(None, None), "default response");
        assert_eq!(response_description(Some("Found"), Some(200)), "Found");
    }
}
