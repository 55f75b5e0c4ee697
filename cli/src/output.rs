#![deny(missing_docs)]

//! # Output
//!
//! Serializes documents and reports, to stdout or to a file.

use contractual_core::AppResult;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Serialization format of written documents.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

/// Renders `value` in `format`.
pub fn render(value: &Value, format: Format) -> AppResult<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Yaml => serde_yaml::to_string(value)?,
    })
}

/// Writes `rendered` to `out` (creating parent directories), or prints it.
pub fn emit(rendered: &str, out: Option<&Path>) -> AppResult<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, rendered)?;
            eprintln!("Written to {:?}", path);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
