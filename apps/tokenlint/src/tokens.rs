//! Token source loading.
//!
//! Accepts DTCG-style nested JSON: any object with `value` or `$value` is a
//! token, its dot-joined object path is the name. Keys starting with `$` are
//! metadata, never groups. A group's `$type` applies to the tokens below it
//! unless they declare their own. A top-level array of `{name, type, value}`
//! objects is accepted as well.

use crate::error::{LintError, Result};
use crate::models::token::Token;
use serde_json::{Map, Value as Json};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Read and flatten a token file.
pub fn load_tokens(path: &Path) -> Result<Vec<Token>> {
    let data = fs::read_to_string(path).map_err(|source| LintError::Read {
        what: "token file",
        path: path.to_path_buf(),
        source,
    })?;
    let json: Json = serde_json::from_str(&data).map_err(|e| LintError::Parse {
        what: "token file",
        path: path.to_path_buf(),
        format: "JSON",
        message: e.to_string(),
    })?;
    let tokens = parse_tokens(&json);
    debug!(count = tokens.len(), path = %path.display(), "loaded tokens");
    Ok(tokens)
}

/// Flatten a parsed token document. Names are unique; the first occurrence
/// of a duplicate wins.
pub fn parse_tokens(json: &Json) -> Vec<Token> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    match json {
        Json::Object(obj) => {
            let mut path = Vec::new();
            walk(obj, &mut path, None, &mut out, &mut seen);
        }
        Json::Array(items) => {
            for item in items {
                let Some(obj) = item.as_object() else {
                    continue;
                };
                let Some(name) = obj.get("name").and_then(Json::as_str) else {
                    continue;
                };
                let Some(value) = token_value(obj) else {
                    continue;
                };
                push_unique(
                    Token::new(name, value.clone(), declared_type(obj)).with_meta(meta_of(obj)),
                    &mut out,
                    &mut seen,
                );
            }
        }
        _ => warn!("token document is neither an object nor an array; no tokens loaded"),
    }
    out
}

fn walk(
    node: &Map<String, Json>,
    path: &mut Vec<String>,
    inherited_type: Option<&str>,
    out: &mut Vec<Token>,
    seen: &mut HashSet<String>,
) {
    if let Some(value) = token_value(node) {
        if path.is_empty() {
            return;
        }
        let ty = declared_type(node).or(inherited_type);
        push_unique(
            Token::new(path.join("."), value.clone(), ty).with_meta(meta_of(node)),
            out,
            seen,
        );
        return;
    }
    let group_type = node.get("$type").and_then(Json::as_str).or(inherited_type);
    for (key, child) in node {
        if key.starts_with('$') {
            continue;
        }
        if let Json::Object(obj) = child {
            path.push(key.clone());
            walk(obj, path, group_type, out, seen);
            path.pop();
        }
    }
}

fn token_value(node: &Map<String, Json>) -> Option<&Json> {
    node.get("$value").or_else(|| node.get("value"))
}

fn declared_type(node: &Map<String, Json>) -> Option<&str> {
    node.get("$type")
        .or_else(|| node.get("type"))
        .and_then(Json::as_str)
}

fn meta_of(node: &Map<String, Json>) -> Map<String, Json> {
    let mut meta = Map::new();
    for (src, dst) in [
        ("$description", "description"),
        ("description", "description"),
        ("$extensions", "extensions"),
        ("extensions", "extensions"),
    ] {
        if let Some(v) = node.get(src) {
            meta.entry(dst.to_string()).or_insert_with(|| v.clone());
        }
    }
    meta
}

fn push_unique(token: Token, out: &mut Vec<Token>, seen: &mut HashSet<String>) {
    if seen.insert(token.name.clone()) {
        out.push(token);
    } else {
        warn!(token = %token.name, "duplicate token name; keeping first occurrence");
    }
}
