//! Response handling: fence stripping, shape normalization, schema
//! acceptance with `issues` salvage, and issue -> diagnostic mapping.

use super::schema::{ResponseSchema, SchemaViolation};
use super::AiRule;
use crate::models::{Diagnostic, Impact};
use serde_json::{Map, Value as Json};
use tracing::warn;

/// Strip one markdown code fence wrapping the whole payload.
pub fn strip_fences(text: &str) -> &str {
    let t = text.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        // single-line fence: drop an inline language tag
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a provider payload as JSON, tolerating a markdown fence.
pub fn parse_payload(text: &str) -> Result<Json, serde_json::Error> {
    serde_json::from_str(strip_fences(text))
}

/// Coerce a bare array into `{ "issues": [...] }`.
pub fn normalize(value: Json) -> Json {
    match value {
        Json::Array(items) => {
            let mut obj = Map::new();
            obj.insert("issues".to_string(), Json::Array(items));
            Json::Object(obj)
        }
        other => other,
    }
}

/// A response accepted for diagnostic mapping.
#[derive(Debug)]
pub struct Accepted {
    pub payload: Json,
    pub issues: Vec<Map<String, Json>>,
    /// Non-empty when strict validation failed and `issues` was salvaged.
    pub violations: Vec<SchemaViolation>,
}

/// Validate strictly; on failure salvage a well-formed `issues` array.
pub fn accept(schema: &ResponseSchema, value: Json) -> Result<Accepted, Vec<SchemaViolation>> {
    let payload = normalize(value);
    let violations = match schema.validate(&payload) {
        Ok(()) => Vec::new(),
        Err(v) => v,
    };
    let Some(items) = payload.get("issues").and_then(Json::as_array) else {
        return Err(violations);
    };
    let issues: Vec<Map<String, Json>> = items
        .iter()
        .filter_map(|i| i.as_object().cloned())
        .collect();
    if !violations.is_empty() {
        warn!(
            violations = %join(&violations),
            salvaged = issues.len(),
            "response failed strict validation; using issues as-is"
        );
    }
    Ok(Accepted {
        payload,
        issues,
        violations,
    })
}

pub(crate) fn join(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn text(entry: &Map<String, Json>, key: &str) -> Option<String> {
    match entry.get(key)? {
        Json::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn line(entry: &Map<String, Json>) -> Option<u32> {
    match entry.get("line")? {
        Json::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Map one `issues[]` entry to a diagnostic carrying the rule's id and
/// severity. `message` comes from `problem`, then `message`, then `reason`.
pub fn issue_to_diagnostic(rule: &AiRule, entry: &Map<String, Json>) -> Diagnostic {
    let problem = text(entry, "problem");
    let reason = text(entry, "reason");
    let message = problem
        .clone()
        .or_else(|| text(entry, "message"))
        .or_else(|| reason.clone())
        .unwrap_or_else(|| rule.description.clone());
    let mut d = Diagnostic::new(rule.id.clone(), rule.severity, message);
    d.token_name = text(entry, "tokenName");
    d.suggestion = text(entry, "suggestion");
    d.file = text(entry, "file");
    d.line = line(entry);
    d.problem = problem;
    d.reason = reason;
    d.suggested_token = text(entry, "suggestedToken");
    d.fixed_code = text(entry, "fixedCode");
    d.impact = entry
        .get("impact")
        .and_then(Json::as_str)
        .and_then(Impact::parse);
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::schema::issues_document;
    use crate::models::Severity;
    use serde_json::json;

    fn rule() -> AiRule {
        let schema = issues_document(
            json!({ "tokenName": { "type": "string" }, "suggestion": { "type": "string" } }),
            &["tokenName", "suggestion"],
        );
        AiRule::new(
            "semantic-naming",
            "Names follow a consistent hierarchy",
            Severity::Warn,
            ResponseSchema::compile(schema).unwrap(),
            |_| String::new(),
        )
    }

    #[test]
    fn test_strip_fences_variants() {
        assert_eq!(strip_fences("```json\n{\"issues\":[]}\n```"), "{\"issues\":[]}");
        assert_eq!(strip_fences("  ```\n[]\n```  "), "[]");
        assert_eq!(strip_fences("```json{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(parse_payload("```json\n{\"issues\":[]}\n```").unwrap(), json!({"issues": []}));
    }

    #[test]
    fn test_bare_array_is_wrapped() {
        let v = normalize(json!([{"tokenName": "a", "suggestion": "b"}]));
        assert_eq!(v, json!({"issues": [{"tokenName": "a", "suggestion": "b"}]}));
        assert_eq!(normalize(json!({"issues": []})), json!({"issues": []}));
    }

    #[test]
    fn test_accept_salvages_issues_on_violation() {
        let r = rule();
        let v = json!({"issues": [{"tokenName": "a", "suggestion": 3}, "junk"], "extra": true});
        let acc = accept(&r.schema, v).unwrap();
        assert!(!acc.violations.is_empty());
        assert_eq!(acc.issues.len(), 1);

        let err = accept(&r.schema, json!({"findings": []})).unwrap_err();
        assert_eq!(err[0].path, "$");
        assert!(err[0].message.contains("issues"));
    }

    #[test]
    fn test_issue_mapping_prefers_problem_and_carries_fields() {
        let r = rule();
        let entry = json!({
            "file": "src/a.css",
            "line": 12,
            "problem": "Hard-coded brand blue",
            "reason": "Bypasses theming",
            "suggestedToken": "color.brand",
            "fixedCode": "color: var(--color-brand);",
            "impact": "high"
        });
        let d = issue_to_diagnostic(&r, entry.as_object().unwrap());
        assert_eq!(d.rule_id, "semantic-naming");
        assert_eq!(d.severity, Severity::Warn);
        assert_eq!(d.message, "Hard-coded brand blue");
        assert_eq!(d.line, Some(12));
        assert_eq!(d.impact, Some(Impact::High));
        assert_eq!(d.suggested_token.as_deref(), Some("color.brand"));
    }

    #[test]
    fn test_simple_shape_falls_back_to_description() {
        let r = rule();
        let entry = json!({"tokenName": "Color Primary", "suggestion": "color.primary", "line": null});
        let d = issue_to_diagnostic(&r, entry.as_object().unwrap());
        assert_eq!(d.message, r.description);
        assert_eq!(d.token_name.as_deref(), Some("Color Primary"));
        assert_eq!(d.suggestion.as_deref(), Some("color.primary"));
        assert_eq!(d.line, None);
        assert_eq!(d.impact, None);
    }
}
