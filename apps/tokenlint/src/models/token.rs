//! Token model: the canonical in-memory design token plus the code files
//! and per-run context handed to every rule.

use crate::values::{infer_type, looks_like_color, normalize_color, pixel_value};
use serde::Serialize;
use serde_json::{Map, Value as Json};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// A named, typed design value. `token_type` is always set; `other` when
/// neither an explicit type nor the value shape says otherwise.
pub struct Token {
    #[serde(rename = "type")]
    pub token_type: String,
    pub name: String,
    pub raw_value: Json,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_value: Option<Json>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Json>>,
}

impl Token {
    pub fn new(name: impl Into<String>, raw_value: Json, explicit_type: Option<&str>) -> Self {
        let token_type = explicit_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .unwrap_or_else(|| infer_type(&raw_value).to_string());
        let normalized_value = normalize_value(&token_type, &raw_value);
        Self {
            token_type,
            name: name.into(),
            raw_value,
            normalized_value,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Map<String, Json>) -> Self {
        if !meta.is_empty() {
            self.meta = Some(meta);
        }
        self
    }

    pub fn is_color(&self) -> bool {
        self.token_type.eq_ignore_ascii_case("color")
    }

    /// Normalized color string for color tokens.
    pub fn color(&self) -> Option<&str> {
        if !self.is_color() {
            return None;
        }
        self.normalized_value.as_ref().and_then(Json::as_str)
    }

    /// Pixel value for numeric dimension-like tokens.
    pub fn pixels(&self) -> Option<f64> {
        self.normalized_value.as_ref().and_then(Json::as_f64)
    }

    /// True for tokens that describe spacing or sizes.
    pub fn is_spacing_like(&self) -> bool {
        let ty = self.token_type.to_ascii_lowercase();
        if matches!(ty.as_str(), "spacing" | "size" | "sizing" | "dimension") {
            return true;
        }
        let name = self.name.to_ascii_lowercase();
        ["spacing", "space", "size", "gap", "padding", "margin", "radius"]
            .iter()
            .any(|k| name.contains(k))
    }
}

const DIMENSION_TYPES: &[&str] = &["dimension", "spacing", "size", "sizing", "radius"];

fn normalize_value(token_type: &str, raw: &Json) -> Option<Json> {
    match raw {
        Json::String(s) if token_type.eq_ignore_ascii_case("color") && looks_like_color(s) => {
            Some(Json::String(normalize_color(s)))
        }
        Json::String(s) if token_type.eq_ignore_ascii_case("color") => {
            Some(Json::String(s.trim().to_ascii_lowercase()))
        }
        _ if token_type.eq_ignore_ascii_case("color") => None,
        _ if is_dimension_type(token_type) => {
            pixel_value(raw).and_then(|n| serde_json::Number::from_f64(n).map(Json::Number))
        }
        _ => None,
    }
}

/// Types whose values are lengths. `number` tokens (line heights, font
/// weights) are unitless and stay unnormalized.
fn is_dimension_type(token_type: &str) -> bool {
    DIMENSION_TYPES
        .iter()
        .any(|t| token_type.eq_ignore_ascii_case(t))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// A source file scanned by static detectors and quoted in AI prompts.
pub struct CodeFile {
    pub path: String,
    pub content: String,
    pub language: String,
}

impl CodeFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let language = language_for(&path).to_string();
        Self {
            path,
            content: content.into(),
            language,
        }
    }
}

fn language_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "css" => "css",
        "scss" | "sass" => "scss",
        "less" => "less",
        "ts" => "ts",
        "tsx" => "tsx",
        "js" | "mjs" | "cjs" => "js",
        "jsx" => "jsx",
        "vue" => "vue",
        "svelte" => "svelte",
        "html" | "htm" => "html",
        _ => "text",
    }
}

#[derive(Debug, Clone, Copy)]
/// Read-only context for one lint run.
pub struct LintContext<'a> {
    pub tokens: &'a [Token],
    pub code_files: &'a [CodeFile],
}

impl<'a> LintContext<'a> {
    pub fn new(tokens: &'a [Token], code_files: &'a [CodeFile]) -> Self {
        Self { tokens, code_files }
    }
}
