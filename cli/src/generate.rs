#![deny(missing_docs)]

//! # Generate Command
//!
//! Projects a contract into an OpenAPI 2, OpenAPI 3 or JSON Schema document.

use crate::output::{emit, render, Format};
use contractual_core::{
    generate_json_schema_document, generate_openapi2_document, generate_openapi3_document,
    AppResult, Contract,
};
use std::path::PathBuf;
use tracing::info;

/// Target document language.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// Swagger 2.0.
    Openapi2,
    /// OpenAPI 3.0.
    Openapi3,
    /// JSON Schema draft-07.
    JsonSchema,
}

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Path to the contract (JSON, or YAML by extension).
    #[clap(long, env = "CONTRACTUAL_CONTRACT")]
    pub contract: PathBuf,

    /// Document language to produce.
    #[clap(long, value_enum, env = "CONTRACTUAL_LANGUAGE")]
    pub language: Language,

    /// Output serialization.
    #[clap(long, value_enum, default_value_t = Format::Json, env = "CONTRACTUAL_FORMAT")]
    pub format: Format,

    /// Output file. If not provided, prints to stdout.
    #[clap(long, env = "CONTRACTUAL_OUT")]
    pub out: Option<PathBuf>,
}

/// Executes the generation.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &GenerateArgs) -> AppResult<()> {
    let contract = Contract::from_path(&args.contract)?;
    let table = contract.type_table()?;

    let document = match args.language {
        Language::Openapi2 => generate_openapi2_document(&contract, &table)?,
        Language::Openapi3 => generate_openapi3_document(&contract, &table)?,
        Language::JsonSchema => generate_json_schema_document(&contract, &table)?,
    };
    info!(language = ?args.language, contract = %contract.name, "document generated");

    emit(&render(&document, args.format)?, args.out.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contractual_core::AppError;
    use std::fs;
    use tempfile::tempdir;

    const CONTRACT: &str = r#"
name: Greeter
version: 2.1.0
endpoints:
  - name: greet
    method: GET
    path: /greet/:name
    request:
      pathParams:
        - name: name
          type: { kind: string }
    responses:
      - status: 200
        body:
          type: { kind: reference, name: Greeting }
types:
  - name: Greeting
    typeDef:
      type:
        kind: object
        properties:
          - name: text
            type: { kind: string }
          - name: mood
            type:
              kind: union
              types: [{ kind: string }, { kind: boolean }]
"#;

    fn args(dir: &std::path::Path, language: Language, format: Format, out: &str) -> GenerateArgs {
        let contract = dir.join("greeter.yaml");
        fs::write(&contract, CONTRACT).unwrap();
        GenerateArgs {
            contract,
            language,
            format,
            out: Some(dir.join(out)),
        }
    }

    #[test]
    fn test_generate_openapi3_json() {
        let dir = tempdir().unwrap();
        let args = args(dir.path(), Language::Openapi3, Format::Json, "out/api.json");
        execute(&args).unwrap();

        let written = fs::read_to_string(dir.path().join("out/api.json")).unwrap();
        let document: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(document["openapi"], "3.0.2");
        assert_eq!(document["info"]["version"], "2.1.0");
        assert!(document["paths"]["/greet/{name}"]["get"].is_object());
        assert!(document["components"]["schemas"]["Greeting"]["properties"]["mood"]["oneOf"]
            .is_array());
    }

    #[test]
    fn test_generate_json_schema_yaml() {
        let dir = tempdir().unwrap();
        let args = args(dir.path(), Language::JsonSchema, Format::Yaml, "schema.yaml");
        execute(&args).unwrap();

        let written = fs::read_to_string(dir.path().join("schema.yaml")).unwrap();
        assert!(written.contains("definitions:"));
        assert!(written.contains("Greeting:"));
    }

    #[test]
    fn test_generate_openapi2_rejects_heterogeneous_union() {
        let dir = tempdir().unwrap();
        let args = args(dir.path(), Language::Openapi2, Format::Json, "swagger.json");
        match execute(&args).unwrap_err() {
            AppError::Unsupported(construct) => {
                assert_eq!(construct.location, "definitions.Greeting");
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(!dir.path().join("swagger.json").exists());
    }
}
