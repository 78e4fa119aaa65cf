//! `raw-pixel`: bare `<n>px` literals that no spacing/size token covers.

use super::{code_lines, column_at, css_var, splice, RuleError};
use crate::models::rule::RuleSettings;
use crate::models::token::{CodeFile, Token};
use crate::models::{Diagnostic, Severity};
use regex::Regex;
use std::sync::OnceLock;

pub const RULE_ID: &str = "raw-pixel";

/// Values within this distance of a token count as a match.
const TOLERANCE: f64 = 0.1;
/// Characters inspected before a match for token references.
const LOOKBEHIND: usize = 20;

fn pixel_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)px\b").expect("pixel literal regex"))
}

pub fn check(
    tokens: &[Token],
    settings: &RuleSettings,
    code_files: &[CodeFile],
) -> Result<Vec<Diagnostic>, RuleError> {
    let severity = settings.severity.unwrap_or(Severity::Warn);
    let scale: Vec<(&Token, f64)> = tokens
        .iter()
        .filter(|t| t.is_spacing_like())
        .filter_map(|t| t.pixels().map(|px| (t, px)))
        .collect();

    let mut out = Vec::new();
    for file in code_files {
        for (line_no, line) in code_lines(file) {
            for caps in pixel_re().captures_iter(line) {
                let (Some(m), Some(num)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                if !is_bare(line, m.start()) || references_token(line, m.start()) {
                    continue;
                }
                let Ok(value) = num.as_str().parse::<f64>() else {
                    continue;
                };
                if scale.iter().any(|(_, px)| (px - value).abs() <= TOLERANCE) {
                    continue;
                }
                let suggested = closest(value, &scale)
                    .unwrap_or_else(|| format!("spacing.{}", num.as_str().replace('.', "-")));
                let replacement = css_var(&suggested);
                let mut d = Diagnostic::new(
                    RULE_ID,
                    severity,
                    format!(
                        "Raw pixel value \"{}\" should use a spacing token",
                        m.as_str()
                    ),
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

/// A literal is bare when it does not continue an identifier or number.
fn is_bare(line: &str, start: usize) -> bool {
    match line[..start].chars().next_back() {
        Some(c) => !(c.is_alphanumeric() || c == '_' || c == '.'),
        None => true,
    }
}

fn references_token(line: &str, start: usize) -> bool {
    let before: Vec<char> = line[..start].chars().collect();
    let window: String = before[before.len().saturating_sub(LOOKBEHIND)..]
        .iter()
        .collect();
    window.contains("var(") || window.contains("--") || window.contains("token")
}

fn closest(value: f64, scale: &[(&Token, f64)]) -> Option<String> {
    scale
        .iter()
        .min_by(|a, b| {
            (a.1 - value)
                .abs()
                .partial_cmp(&(b.1 - value).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(t, _)| t.name.clone())
}
