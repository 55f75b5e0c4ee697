#![deny(missing_docs)]

//! # String Coercion
//!
//! Everything outside a body arrives as text. These helpers match recorded paths against
//! endpoint templates and turn raw strings into JSON values shaped after a parameter's root
//! types, so they can be checked with the same schemas as bodies.

use crate::error::{AppError, AppResult};
use crate::types::Type;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde_json::{Number, Value};

/// Matches `path` against a `:param` template, returning the decoded captures in order.
///
/// A trailing slash on either side is ignored. Returns `Ok(None)` when the path does not match.
pub fn match_path(template: &str, path: &str) -> AppResult<Option<Vec<(String, String)>>> {
    let mut names = Vec::new();
    let mut pattern = String::from("^");
    for segment in trim_trailing_slash(template).split('/').skip(1) {
        pattern.push('/');
        match segment.strip_prefix(':') {
            Some(name) => {
                names.push(name.to_string());
                pattern.push_str("([^/]+)");
            }
            None => pattern.push_str(&regex::escape(segment)),
        }
    }
    if pattern == "^" {
        pattern.push('/');
    }
    pattern.push('$');

    let re = Regex::new(&pattern)
        .map_err(|e| AppError::General(format!("Invalid path template '{template}': {e}")))?;
    let Some(captures) = re.captures(trim_trailing_slash(path)) else {
        return Ok(None);
    };
    let values = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let raw = captures.get(i + 1).map(|m| m.as_str()).unwrap_or_default();
            (name, decode(raw))
        })
        .collect();
    Ok(Some(values))
}

fn trim_trailing_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}

/// Percent-decodes a path segment, replacing invalid UTF-8.
pub fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Interprets `raw` as the first root type it parses as.
///
/// Integers, numbers and booleans are tried in root order; any other root (or no successful
/// parse) keeps the string, leaving the mismatch to schema validation.
pub fn coerce(raw: &str, roots: &[Type]) -> Value {
    for root in roots {
        let parsed = match root {
            Type::Int32 | Type::Int64 | Type::IntLiteral { .. } => {
                raw.parse::<i64>().ok().map(Value::from)
            }
            Type::Float | Type::Double | Type::FloatLiteral { .. } => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            Type::Boolean | Type::BooleanLiteral { .. } => match raw {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            Type::String | Type::StringLiteral { .. } | Type::Date | Type::DateTime => {
                Some(Value::String(raw.to_string()))
            }
            Type::Null
            | Type::Object { .. }
            | Type::Array { .. }
            | Type::Union { .. }
            | Type::Intersection { .. }
            | Type::Reference { .. } => None,
        };
        if let Some(value) = parsed {
            return value;
        }
    }
    Value::String(raw.to_string())
}

/// Coerces every raw value with the same element roots.
pub fn coerce_all<'a>(raw: impl IntoIterator<Item = &'a str>, roots: &[Type]) -> Value {
    Value::Array(raw.into_iter().map(|item| coerce(item, roots)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_path_captures_in_order() {
        let captures = match_path("/shops/:shopId/orders/:orderId", "/shops/7/orders/a%20b")
            .unwrap()
            .unwrap();
        assert_eq!(
            captures,
            vec![
                ("shopId".to_string(), "7".to_string()),
                ("orderId".to_string(), "a b".to_string())
            ]
        );
    }

    #[test]
    fn test_match_path_ignores_trailing_slash() {
        assert!(match_path("/pets", "/pets/").unwrap().is_some());
        assert!(match_path("/pets/", "/pets").unwrap().is_some());
        assert!(match_path("/", "/").unwrap().is_some());
    }

    #[test]
    fn test_match_path_rejects_other_paths() {
        assert!(match_path("/pets/:id", "/pets").unwrap().is_none());
        assert!(match_path("/pets/:id", "/pets/1/toys").unwrap().is_none());
        assert!(match_path("/a.b", "/axb").unwrap().is_none());
    }

    #[test]
    fn test_coerce_follows_root_order() {
        assert_eq!(coerce("42", &[Type::Int64]), json!(42));
        assert_eq!(coerce("42", &[Type::String, Type::Int64]), json!("42"));
        assert_eq!(coerce("1.5", &[Type::Int32, Type::Double]), json!(1.5));
        assert_eq!(coerce("true", &[Type::Boolean]), json!(true));
        assert_eq!(coerce("yes", &[Type::Boolean]), json!("yes"));
    }

    #[test]
    fn test_coerce_all() {
        assert_eq!(coerce_all(["1", "2"], &[Type::Int32]), json!([1, 2]));
    }
}
