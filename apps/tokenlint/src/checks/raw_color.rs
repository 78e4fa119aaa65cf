//! `raw-color`: color literals in code that no color token covers.

use super::{code_lines, column_at, css_var, splice, RuleError};
use crate::models::rule::RuleSettings;
use crate::models::token::{CodeFile, Token};
use crate::models::{Diagnostic, Severity};
use crate::values::{color_distance, normalize_color, rgb_channels};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

pub const RULE_ID: &str = "raw-color";

/// Hex literals and color functions with literal arguments only, so
/// `rgb(var(--brand-rgb))` is left alone.
fn color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)#(?:[0-9a-f]{6}|[0-9a-f]{3})\b|rgba?\([-0-9.,%/\s]+\)|hsla?\((?:[-0-9.,%/\s]|deg|turn|rad)+\)",
        )
        .expect("color literal regex")
    })
}

pub fn check(
    tokens: &[Token],
    settings: &RuleSettings,
    code_files: &[CodeFile],
) -> Result<Vec<Diagnostic>, RuleError> {
    let severity = settings.severity.unwrap_or(Severity::Warn);
    let palette: Vec<&Token> = tokens.iter().filter(|t| t.color().is_some()).collect();
    let known: HashSet<&str> = palette.iter().filter_map(|t| t.color()).collect();

    let mut out = Vec::new();
    for file in code_files {
        for (line_no, line) in code_lines(file) {
            for m in color_re().find_iter(line) {
                let literal = m.as_str();
                let normalized = normalize_color(literal);
                if known.contains(normalized.as_str()) {
                    continue;
                }
                let suggested = nearest_color_token(&normalized, &palette)
                    .unwrap_or_else(|| proposed_name(&normalized));
                let replacement = css_var(&suggested);
                let mut d = Diagnostic::new(
                    RULE_ID,
                    severity,
                    format!("Raw color \"{}\" should use a design token", literal),
                );
                d.file = Some(file.path.clone());
                d.line = Some(line_no);
                d.column = Some(column_at(line, m.start()));
                d.suggestion = Some(format!("Replace with {}", replacement));
                d.fixed_code = Some(splice(line, m.start(), m.end(), &replacement));
                d.suggested_token = Some(suggested);
                out.push(d);
            }
        }
    }
    Ok(out)
}

/// Closest color token in RGB space, or the first color token when the
/// literal is not RGB-comparable.
fn nearest_color_token(normalized: &str, palette: &[&Token]) -> Option<String> {
    let first = palette.first()?;
    let Some(target) = rgb_channels(normalized) else {
        return Some(first.name.clone());
    };
    palette
        .iter()
        .filter_map(|t| {
            let rgb = rgb_channels(t.color()?)?;
            Some((color_distance(target, rgb), *t))
        })
        .min_by_key(|(d, _)| *d)
        .map(|(_, t)| t.name.clone())
        .or_else(|| Some(first.name.clone()))
}

/// Name for a new token when the set has no colors at all.
fn proposed_name(normalized: &str) -> String {
    let slug: String = normalized
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    format!("color.{}", slug)
}
