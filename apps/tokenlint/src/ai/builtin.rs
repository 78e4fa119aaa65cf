//! Built-in AI rules.

use super::prompt::render_context;
use super::schema::{issues_document, with_fields, ResponseSchema};
use super::AiRule;
use crate::models::token::{LintContext, Token};
use crate::models::{Diagnostic, Severity};
use serde_json::{json, Map, Value as Json};

pub const SEMANTIC_NAMING: &str = "semantic-naming";
pub const SPACING_CONSISTENCY: &str = "spacing-consistency";
pub const DESIGN_COMPLEXITY: &str = "design-complexity";

pub const BUILTIN_IDS: &[&str] = &[SEMANTIC_NAMING, SPACING_CONSISTENCY, DESIGN_COMPLEXITY];

/// Build a built-in rule by id.
pub fn builtin(id: &str) -> Option<AiRule> {
    match id {
        SEMANTIC_NAMING => Some(semantic_naming()),
        SPACING_CONSISTENCY => Some(spacing_consistency()),
        DESIGN_COMPLEXITY => Some(design_complexity()),
        _ => None,
    }
}

fn string() -> Json {
    json!({ "type": "string" })
}

fn nullable_string() -> Json {
    json!({ "type": ["string", "null"] })
}

fn impact() -> Json {
    json!({ "enum": ["Low", "Medium", "High", null] })
}

fn compile(document: Json) -> ResponseSchema {
    ResponseSchema::compile(document).expect("built-in response schema")
}

fn instructions(task: &str, outline: &str, ctx: &LintContext<'_>) -> String {
    format!(
        "{}\n\nReturn JSON matching this JSON Schema:\n{}\nReturn an empty issues list when nothing is wrong.\n\n{}",
        task,
        outline,
        render_context(ctx)
    )
}

pub fn semantic_naming() -> AiRule {
    let schema = compile(issues_document(
        json!({
            "tokenName": string(),
            "problem": nullable_string(),
            "suggestion": nullable_string(),
            "suggestedToken": nullable_string(),
            "impact": impact()
        }),
        &["tokenName"],
    ));
    let outline = schema.outline();
    AiRule::new(
        SEMANTIC_NAMING,
        "Token names follow a consistent, semantic hierarchy",
        Severity::Warn,
        schema,
        move |ctx| {
            instructions(
                "Audit the hierarchical naming of these design tokens. Flag names that mix \
                 naming schemes, describe raw values instead of intent (e.g. color.blue-500 used \
                 as a primary action), or break the category.role.variant structure used by \
                 their siblings. Suggest a consistent replacement name for each.",
                &outline,
                ctx,
            )
        },
    )
}

fn is_spacing_candidate(t: &Token) -> bool {
    let name = t.name.to_ascii_lowercase();
    t.token_type.eq_ignore_ascii_case("spacing")
        || ["spacing", "gap", "padding", "margin"]
            .iter()
            .any(|k| name.contains(k))
}

pub fn spacing_consistency() -> AiRule {
    let schema = compile(issues_document(
        json!({
            "tokenName": string(),
            "problem": nullable_string(),
            "reason": nullable_string(),
            "suggestion": nullable_string(),
            "suggestedToken": nullable_string(),
            "impact": impact()
        }),
        &["tokenName"],
    ));
    let outline = schema.outline();
    AiRule::new(
        SPACING_CONSISTENCY,
        "Spacing tokens align to a consistent grid",
        Severity::Warn,
        schema,
        move |ctx| {
            instructions(
                "Infer the base grid (for example 4px or 8px) of these spacing tokens and flag \
                 outliers that do not align with it, near-duplicates, and gaps in the scale. \
                 Suggest the on-grid value or existing token to use instead.",
                &outline,
                ctx,
            )
        },
    )
    .with_token_filter(is_spacing_candidate)
}

pub fn design_complexity() -> AiRule {
    let issues = issues_document(
        json!({
            "problem": string(),
            "reason": nullable_string(),
            "tokenName": nullable_string(),
            "suggestion": nullable_string(),
            "impact": impact()
        }),
        &["problem"],
    );
    let mut fields = Map::new();
    fields.insert(
        "score".into(),
        json!({ "type": "number", "minimum": 0, "maximum": 100 }),
    );
    fields.insert(
        "proposals".into(),
        json!({ "type": "array", "items": { "type": "string" } }),
    );
    let schema = compile(with_fields(issues, fields));
    let outline = schema.outline();
    AiRule::new(
        DESIGN_COMPLEXITY,
        "The token set stays small and coherent",
        Severity::Info,
        schema,
        move |ctx| {
            instructions(
                "Assess the overall complexity of this design token set: redundant values, \
                 too many near-identical shades or sizes, and categories that could be merged. \
                 Give a complexity score from 0 (minimal) to 100 (unmanageable) and concrete \
                 consolidation proposals.",
                &outline,
                ctx,
            )
        },
    )
    .with_summary(complexity_summary)
}

/// One info diagnostic carrying the score and proposals.
fn complexity_summary(rule: &AiRule, payload: &Json) -> Option<Diagnostic> {
    let score = payload.get("score").and_then(Json::as_f64)?;
    let proposals: Vec<&str> = payload
        .get("proposals")
        .and_then(Json::as_array)
        .map(|a| a.iter().filter_map(Json::as_str).collect())
        .unwrap_or_default();
    let mut d = Diagnostic::new(
        rule.id.clone(),
        Severity::Info,
        format!("Design system complexity score: {}/100", score.round()),
    );
    if !proposals.is_empty() {
        d.suggestion = Some(proposals.join("; "));
    }
    Some(d)
}
