//! Rule settings as they appear under `[rules.<id>]` in `tokenlint.toml`.
//!
//! Presence of an id enables the static rule; its settings carry the
//! severity and rule parameters.

use super::Severity;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
/// Per-rule settings. Which fields are required depends on the rule.
pub struct RuleSettings {
    #[serde(default)]
    pub severity: Option<Severity>,
    /// Regular expression used by `naming-convention`.
    #[serde(default)]
    pub pattern: Option<String>,
}

impl RuleSettings {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity: Some(severity),
            pattern: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// Rule id -> settings. Ordered so logs and listings are stable.
pub type RuleConfig = BTreeMap<String, RuleSettings>;
