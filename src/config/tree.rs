//! Read-only typed accessors over the parsed JSON tree.
//!
//! The configuration is consumed as a generic tagged-variant tree
//! (`serde_json::Value`). These helpers replace the pervasive
//! is-it-really-an-object checks with accessors that name what they were
//! looking for, so callers get a [`TreeError`] instead of a stray `None`.

use std::fmt;

use serde_json::{Map, Value};

/// Human-readable name of a JSON node kind, used in wrong-type reports.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Typed views over a JSON node. `what` names the node for diagnostics
/// ("module[GPIO]", "item[3].attr", ...).
pub trait TreeAccess {
    fn want_object(&self, what: &str) -> Result<&Map<String, Value>, TreeError>;
    fn want_array(&self, what: &str) -> Result<&[Value], TreeError>;
    fn want_str(&self, what: &str) -> Result<&str, TreeError>;
    fn want_u64(&self, what: &str) -> Result<u64, TreeError>;
}

impl TreeAccess for Value {
    fn want_object(&self, what: &str) -> Result<&Map<String, Value>, TreeError> {
        self.as_object().ok_or_else(|| TreeError::wrong_type(what, "object", self))
    }

    fn want_array(&self, what: &str) -> Result<&[Value], TreeError> {
        self.as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| TreeError::wrong_type(what, "array", self))
    }

    fn want_str(&self, what: &str) -> Result<&str, TreeError> {
        self.as_str().ok_or_else(|| TreeError::wrong_type(what, "string", self))
    }

    fn want_u64(&self, what: &str) -> Result<u64, TreeError> {
        self.as_u64().ok_or_else(|| TreeError::wrong_type(what, "unsigned number", self))
    }
}

/// Looks a key up in an object, reporting the member path on a miss.
pub fn member<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    what: &str,
) -> Result<&'a Value, TreeError> {
    map.get(key).ok_or_else(|| TreeError::NotFound {
        what: format!("{what}.{key}"),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    NotFound { what: String },
    WrongType { what: String, expected: &'static str, actual: &'static str },
}

impl TreeError {
    fn wrong_type(what: &str, expected: &'static str, actual: &Value) -> Self {
        TreeError::WrongType {
            what: what.to_string(),
            expected,
            actual: kind_name(actual),
        }
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::NotFound { what } => write!(f, "{what} is missing"),
            TreeError::WrongType { what, expected, actual } => {
                write!(f, "{what} is {actual}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for TreeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_views_succeed_on_matching_kinds() {
        let value = json!({"a": [1, 2], "s": "text", "n": 7});
        let obj = value.want_object("root").expect("object");
        assert_eq!(member(obj, "s", "root").and_then(|v| v.want_str("root.s")), Ok("text"));
        assert_eq!(obj["n"].want_u64("root.n"), Ok(7));
        assert_eq!(obj["a"].want_array("root.a").map(<[Value]>::len), Ok(2));
    }

    #[test]
    fn wrong_kind_names_both_sides() {
        let value = json!("just a string");
        let err = value.want_object("root").unwrap_err();
        assert_eq!(
            err,
            TreeError::WrongType {
                what: "root".into(),
                expected: "object",
                actual: "string"
            }
        );
    }

    #[test]
    fn missing_member_reports_path() {
        let value = json!({});
        let obj = value.want_object("root").expect("object");
        let err = member(obj, "__modules__", "root").unwrap_err();
        assert_eq!(err.to_string(), "root.__modules__ is missing");
    }
}
