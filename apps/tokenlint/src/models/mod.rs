//! Shared data models for tokens, diagnostics, and lint reports.

pub mod rule;
pub mod token;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Diagnostic severity. `error` drives the non-zero exit upstream.
pub enum Severity {
    Error,
    #[serde(alias = "warning")]
    Warn,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
        }
    }

    /// Lenient parse used for values coming from config and model output.
    pub fn parse(s: &str) -> Option<Severity> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warn" | "warning" => Some(Severity::Warn),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Estimated impact of fixing an AI-reported issue.
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    pub fn parse(s: &str) -> Option<Impact> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Impact::Low),
            "medium" => Some(Impact::Medium),
            "high" => Some(Impact::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A single reported issue. Static and AI rules share this shape; every
/// field past `message` is optional fix metadata.
pub struct Diagnostic {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<Impact>,
}

impl Diagnostic {
    pub fn new(rule_id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            token_name: None,
            suggestion: None,
            file: None,
            line: None,
            column: None,
            problem: None,
            reason: None,
            suggested_token: None,
            fixed_code: None,
            impact: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Severity counts over a report.
pub struct Summary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl Summary {
    pub fn from_issues(issues: &[Diagnostic]) -> Self {
        let mut s = Summary {
            total: issues.len(),
            ..Default::default()
        };
        for is in issues {
            match is.severity {
                Severity::Error => s.errors += 1,
                Severity::Warn => s.warnings += 1,
                Severity::Info => s.info += 1,
            }
        }
        s
    }
}

#[derive(Debug, Clone, Default, Serialize)]
/// Lint results container; also the JSON report shape.
pub struct LintReport {
    pub issues: Vec<Diagnostic>,
    pub summary: Summary,
}

impl LintReport {
    pub fn new(issues: Vec<Diagnostic>) -> Self {
        let summary = Summary::from_issues(&issues);
        Self { issues, summary }
    }

    /// True when the run must signal failure to CI.
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }
}
