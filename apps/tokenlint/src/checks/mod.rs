//! Static rule engine.
//!
//! Static rules are pure functions over tokens and code files. A rule runs
//! only when its id is present in the rule config. Each rule is isolated:
//! an error or panic is logged and the remaining rules still run.

pub mod naming;
pub mod raw_color;
pub mod raw_pixel;

use crate::models::rule::{RuleConfig, RuleSettings};
use crate::models::token::{CodeFile, Token};
use crate::models::Diagnostic;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, warn};

/// Rule-local failures. Never fatal to the run.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("missing required setting '{0}'")]
    MissingSetting(&'static str),

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type StaticCheck =
    fn(&[Token], &RuleSettings, &[CodeFile]) -> Result<Vec<Diagnostic>, RuleError>;

/// A deterministic check registered by id.
#[derive(Debug)]
pub struct StaticRule {
    pub id: &'static str,
    pub description: &'static str,
    pub check: StaticCheck,
}

/// Built-in static rules in execution order.
pub const STATIC_RULES: &[StaticRule] = &[
    StaticRule {
        id: naming::RULE_ID,
        description: "Token names match the configured naming pattern",
        check: naming::check,
    },
    StaticRule {
        id: raw_color::RULE_ID,
        description: "Code uses color tokens instead of raw color literals",
        check: raw_color::check,
    },
    StaticRule {
        id: raw_pixel::RULE_ID,
        description: "Code uses spacing tokens instead of raw pixel values",
        check: raw_pixel::check,
    },
];

pub fn find_static_rule(id: &str) -> Option<&'static StaticRule> {
    STATIC_RULES.iter().find(|r| r.id == id)
}

/// Run every configured static rule and collect diagnostics in rule order.
pub fn run_static_rules(
    tokens: &[Token],
    config: &RuleConfig,
    code_files: &[CodeFile],
) -> Vec<Diagnostic> {
    for id in config.keys() {
        if find_static_rule(id).is_none() {
            warn!(rule = %id, "unknown static rule in config; ignored");
        }
    }
    let mut out = Vec::new();
    for rule in STATIC_RULES {
        if let Some(settings) = config.get(rule.id) {
            out.extend(run_isolated(rule, tokens, settings, code_files));
        }
    }
    out
}

/// Run one rule, turning errors and panics into an empty result.
pub fn run_isolated(
    rule: &StaticRule,
    tokens: &[Token],
    settings: &RuleSettings,
    code_files: &[CodeFile],
) -> Vec<Diagnostic> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        (rule.check)(tokens, settings, code_files)
    }));
    match outcome {
        Ok(Ok(found)) => {
            debug!(rule = rule.id, count = found.len(), "static rule finished");
            found
        }
        Ok(Err(e)) => {
            warn!(rule = rule.id, error = %e, "static rule failed; skipping");
            Vec::new()
        }
        Err(_) => {
            warn!(rule = rule.id, "static rule panicked; skipping");
            Vec::new()
        }
    }
}

/// Code lines eligible for detection: 1-based numbers, comment lines skipped.
pub(crate) fn code_lines(file: &CodeFile) -> impl Iterator<Item = (u32, &str)> {
    file.content
        .lines()
        .enumerate()
        .map(|(i, l)| (i as u32 + 1, l))
        .filter(|(_, l)| !is_comment_line(l))
}

pub(crate) fn is_comment_line(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("//") || t.starts_with('*') || t.starts_with("/*")
}

/// 1-based character column of a byte offset within `line`.
pub(crate) fn column_at(line: &str, byte_offset: usize) -> u32 {
    line[..byte_offset].chars().count() as u32 + 1
}

/// CSS custom property reference for a token name.
pub(crate) fn css_var(token_name: &str) -> String {
    format!("var(--{})", token_name.replace('.', "-"))
}

/// Replace `[start, end)` of `line` with `with`.
pub(crate) fn splice(line: &str, start: usize, end: usize, with: &str) -> String {
    format!("{}{}{}", &line[..start], with, &line[end..])
}
