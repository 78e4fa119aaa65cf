//! Prompt context rendering and the `{{TOKENS}}` templating contract.

use crate::models::token::LintContext;
use serde_json::{json, Value as Json};

pub const TOKENS_PLACEHOLDER: &str = "{{TOKENS}}";

/// Per-file cap on code quoted into prompts, in characters.
const MAX_FILE_CHARS: usize = 4000;

/// Serialized token (and code file) context for a prompt.
pub fn render_context(ctx: &LintContext<'_>) -> String {
    let tokens: Vec<Json> = ctx
        .tokens
        .iter()
        .map(|t| json!({ "name": t.name, "type": t.token_type, "value": t.raw_value }))
        .collect();
    let mut out = String::from("Design tokens (JSON):\n");
    out.push_str(&serde_json::to_string_pretty(&tokens).unwrap_or_else(|_| "[]".to_string()));
    if !ctx.code_files.is_empty() {
        out.push_str("\n\nCode files:\n");
        for f in ctx.code_files {
            out.push_str(&format!("--- {} ({})\n", f.path, f.language));
            out.push_str(&truncate(&f.content, MAX_FILE_CHARS));
            out.push('\n');
        }
    }
    out
}

/// Substitute the placeholder with the context, or append the context.
pub fn apply_template(template: &str, ctx: &LintContext<'_>) -> String {
    let context = render_context(ctx);
    if template.contains(TOKENS_PLACEHOLDER) {
        template.replace(TOKENS_PLACEHOLDER, &context)
    } else {
        format!("{}\n\n{}", template.trim_end(), context)
    }
}

fn truncate(content: &str, max: usize) -> String {
    match content.char_indices().nth(max) {
        Some((cut, _)) => format!("{}\n... (truncated)", &content[..cut]),
        None => content.to_string(),
    }
}
