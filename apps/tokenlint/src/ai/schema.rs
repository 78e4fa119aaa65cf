//! Response schemas for AI rules.
//!
//! A schema is a JSON Schema document (draft 2020-12) for the whole response
//! object: an `issues` array whose items declare the issue fields, plus any
//! rule-specific top-level properties. Built-in rules build the document with
//! `json!`; custom rules load the same document from JSON, TOML or YAML:
//!
//! ```toml
//! type = "object"
//! required = ["issues"]
//!
//! [properties.issues]
//! type = "array"
//!
//! [properties.issues.items]
//! type = "object"
//! required = ["tokenName"]
//!
//! [properties.issues.items.properties.tokenName]
//! type = "string"
//!
//! [properties.issues.items.properties.impact]
//! enum = ["Low", "Medium", "High", null]
//! ```

use jsonschema::{Draft, Validator};
use serde_json::{json, Map, Value as Json};
use std::fmt;

const ISSUE_FIELDS: &str = "/properties/issues/items/properties";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl SchemaViolation {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A compiled response schema.
pub struct ResponseSchema {
    document: Json,
    validator: Validator,
}

impl fmt::Debug for ResponseSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseSchema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl ResponseSchema {
    /// Compile a JSON Schema document.
    pub fn compile(document: Json) -> Result<Self, String> {
        if !document.is_object() {
            return Err("schema must be a JSON object".to_string());
        }
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&document)
            .map_err(|err| format!("invalid schema: {err}"))?;
        Ok(Self {
            document,
            validator,
        })
    }

    /// Names declared for `issues[]` entries, in document order.
    pub fn issue_fields(&self) -> Vec<&str> {
        self.document
            .pointer(ISSUE_FIELDS)
            .and_then(Json::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Strict validation of a normalized response object.
    pub fn validate(&self, value: &Json) -> Result<(), Vec<SchemaViolation>> {
        let violations: Vec<SchemaViolation> = self
            .validator
            .iter_errors(value)
            .map(|err| {
                let path = json_path(&err.instance_path.to_string());
                SchemaViolation::new(path, err.to_string())
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Pretty-printed schema document, embedded in prompts.
    pub fn outline(&self) -> String {
        serde_json::to_string_pretty(&self.document).unwrap_or_else(|_| "{}".to_string())
    }
}

/// `/issues/0/tokenName` -> `$.issues[0].tokenName`.
fn json_path(pointer: &str) -> String {
    let mut out = String::from("$");
    for seg in pointer.split('/').skip(1) {
        let seg = seg.replace("~1", "/").replace("~0", "~");
        if !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()) {
            out.push_str(&format!("[{}]", seg));
        } else {
            out.push('.');
            out.push_str(&seg);
        }
    }
    out
}

/// Response document for `issues` entries with the given item properties.
/// `required` names the fields every entry must carry.
pub fn issues_document(issue: Json, required: &[&str]) -> Json {
    json!({
        "type": "object",
        "required": ["issues"],
        "properties": {
            "issues": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": required,
                    "properties": issue
                }
            }
        }
    })
}

/// Add top-level properties (required) next to `issues`.
pub fn with_fields(mut document: Json, fields: Map<String, Json>) -> Json {
    let names: Vec<Json> = fields.keys().map(|k| Json::String(k.clone())).collect();
    if let Some(props) = document.get_mut("properties").and_then(Json::as_object_mut) {
        props.extend(fields);
    }
    if let Some(required) = document.get_mut("required").and_then(Json::as_array_mut) {
        required.extend(names);
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ResponseSchema {
        let doc = issues_document(
            json!({
                "tokenName": { "type": "string" },
                "impact": { "enum": ["Low", "Medium", "High", null] }
            }),
            &["tokenName"],
        );
        let mut fields = Map::new();
        fields.insert("score".into(), json!({ "type": "number", "minimum": 0, "maximum": 100 }));
        fields.insert("proposals".into(), json!({ "type": "array", "items": { "type": "string" } }));
        ResponseSchema::compile(with_fields(doc, fields)).unwrap()
    }

    #[test]
    fn test_valid_payload_passes() {
        let v = json!({
            "issues": [{"tokenName": "a", "impact": "High"}, {"tokenName": "b", "impact": null}],
            "score": 42,
            "proposals": ["merge greys"]
        });
        assert!(schema().validate(&v).is_ok());
    }

    #[test]
    fn test_violations_are_reported_with_paths() {
        let v = json!({
            "issues": [{"tokenName": "a", "impact": "Huge"}, 3],
            "score": 140,
            "proposals": ["ok", 1]
        });
        let errs = schema().validate(&v).unwrap_err();
        let paths: Vec<_> = errs.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"$.issues[0].impact"));
        assert!(paths.contains(&"$.issues[1]"));
        assert!(paths.contains(&"$.score"));
        assert!(paths.contains(&"$.proposals[1]"));
    }

    #[test]
    fn test_missing_issues_and_non_object() {
        assert!(schema().validate(&json!([])).is_err());
        let errs = schema().validate(&json!({"score": 1, "proposals": []})).unwrap_err();
        assert_eq!(errs[0].path, "$");
        assert!(errs[0].message.contains("issues"));
    }

    #[test]
    fn test_issue_fields_and_outline() {
        let s = schema();
        assert_eq!(s.issue_fields(), vec!["tokenName", "impact"]);
        let o = s.outline();
        assert!(o.contains("\"tokenName\""));
        assert!(o.contains("\"maximum\": 100"));
    }

    #[test]
    fn test_invalid_documents_are_rejected() {
        assert!(ResponseSchema::compile(json!([])).is_err());
        assert!(ResponseSchema::compile(json!({"type": "no-such-type"})).is_err());
    }

    #[test]
    fn test_json_path() {
        assert_eq!(json_path(""), "$");
        assert_eq!(json_path("/issues/2/tokenName"), "$.issues[2].tokenName");
    }
}
