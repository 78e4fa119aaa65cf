//! Custom AI rules loaded from a prompt file and a schema file.

use super::prompt::apply_template;
use super::schema::ResponseSchema;
use super::AiRule;
use crate::error::{LintError, Result};
use crate::models::Severity;
use serde::Deserialize;
use serde_json::{Map, Value as Json};
use std::fs;
use std::path::Path;
use tracing::debug;

const DEFAULT_EXPORT: &str = "default";

#[derive(Debug, Clone, Deserialize)]
/// One `[[ai.custom]]` entry.
pub struct CustomRuleConfig {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    /// Prompt template path, relative to the repo root.
    pub prompt: String,
    /// Schema file path (JSON, TOML or YAML), relative to the repo root.
    pub schema: String,
    /// Named schema to use when the file holds several.
    #[serde(default)]
    pub export: Option<String>,
}

/// A schema file holds one JSON Schema document or a map of named ones.
#[derive(Debug)]
enum SchemaFile {
    Single(Json),
    Named(Map<String, Json>),
}

impl SchemaFile {
    /// A top-level `type`, `properties` or `$schema` key marks a single document.
    fn from_value(value: Json) -> Option<Self> {
        let Json::Object(map) = value else {
            return None;
        };
        if ["type", "properties", "$schema"].iter().any(|k| map.contains_key(*k)) {
            Some(SchemaFile::Single(Json::Object(map)))
        } else {
            Some(SchemaFile::Named(map))
        }
    }
}

/// Read and validate a custom rule. Any failure is fatal for the run.
pub fn load_custom_rule(root: &Path, cfg: &CustomRuleConfig) -> Result<AiRule> {
    let prompt_path = root.join(&cfg.prompt);
    let template = fs::read_to_string(&prompt_path).map_err(|source| LintError::Read {
        what: "custom rule prompt",
        path: prompt_path.clone(),
        source,
    })?;
    if template.trim().is_empty() {
        return Err(invalid(cfg, format!("prompt file '{}' is empty", cfg.prompt)));
    }

    let schema_path = root.join(&cfg.schema);
    let document = select_schema(cfg, parse_schema_file(&schema_path)?)?;
    let schema = ResponseSchema::compile(document).map_err(|message| invalid(cfg, message))?;
    if schema.issue_fields().is_empty() {
        return Err(invalid(
            cfg,
            "schema declares no issue fields (properties.issues.items.properties)",
        ));
    }
    debug!(rule = %cfg.id, schema = %schema_path.display(), "loaded custom AI rule");

    let description = cfg
        .description
        .clone()
        .unwrap_or_else(|| format!("Custom rule {}", cfg.id));
    Ok(AiRule::new(
        cfg.id.clone(),
        description,
        cfg.severity.unwrap_or(Severity::Warn),
        schema,
        move |ctx| apply_template(&template, ctx),
    ))
}

fn parse_schema_file(path: &Path) -> Result<SchemaFile> {
    let text = fs::read_to_string(path).map_err(|source| LintError::Read {
        what: "custom rule schema",
        path: path.to_path_buf(),
        source,
    })?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let parse_err = |format: &'static str, message: String| LintError::Parse {
        what: "custom rule schema",
        path: path.to_path_buf(),
        format,
        message,
    };
    let (format, value) = match ext.as_str() {
        "toml" => (
            "TOML",
            toml::from_str::<Json>(&text).map_err(|e| parse_err("TOML", e.to_string()))?,
        ),
        "yaml" | "yml" => (
            "YAML",
            serde_yaml::from_str::<Json>(&text).map_err(|e| parse_err("YAML", e.to_string()))?,
        ),
        _ => (
            "JSON",
            serde_json::from_str::<Json>(&text).map_err(|e| parse_err("JSON", e.to_string()))?,
        ),
    };
    SchemaFile::from_value(value)
        .ok_or_else(|| parse_err(format, "expected a schema object or a map of schemas".into()))
}

fn select_schema(cfg: &CustomRuleConfig, file: SchemaFile) -> Result<Json> {
    match file {
        SchemaFile::Single(schema) => match cfg.export.as_deref() {
            None | Some(DEFAULT_EXPORT) => Ok(schema),
            Some(name) => Err(invalid(
                cfg,
                format!("export '{}' requested but the schema file has a single schema", name),
            )),
        },
        SchemaFile::Named(mut named) => {
            let wanted = match cfg.export.as_deref() {
                Some(name) => name.to_string(),
                None if named.len() == 1 => named.keys().next().cloned().unwrap_or_default(),
                None => DEFAULT_EXPORT.to_string(),
            };
            if let Some(schema) = named.remove(&wanted) {
                return Ok(schema);
            }
            let mut available: Vec<String> = named.keys().cloned().collect();
            available.sort();
            let available = available.join(", ");
            Err(invalid(
                cfg,
                format!("schema export '{}' not found (available: {})", wanted, available),
            ))
        }
    }
}

fn invalid(cfg: &CustomRuleConfig, message: impl Into<String>) -> LintError {
    LintError::CustomRule {
        id: cfg.id.clone(),
        message: message.into(),
    }
}
