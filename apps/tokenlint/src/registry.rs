//! Rule registry: the static rules plus the AI rules enabled for a run.
//!
//! Built on startup from config; custom AI rules are loaded and validated
//! here, so a bad prompt or schema file fails the run before any rule runs.

use crate::ai::builtin::{self, BUILTIN_IDS};
use crate::ai::custom::{load_custom_rule, CustomRuleConfig};
use crate::ai::AiRule;
use crate::checks::{StaticRule, STATIC_RULES};
use crate::error::{LintError, Result};
use crate::models::Severity;
use std::path::Path;
use tracing::warn;

/// Any rule the tool knows about.
#[derive(Debug, Clone, Copy)]
pub enum Rule<'a> {
    Static(&'a StaticRule),
    Ai(&'a AiRule),
}

impl<'a> Rule<'a> {
    pub fn id(&self) -> &'a str {
        match *self {
            Rule::Static(r) => r.id,
            Rule::Ai(r) => &r.id,
        }
    }

    pub fn description(&self) -> &'a str {
        match *self {
            Rule::Static(r) => r.description,
            Rule::Ai(r) => &r.description,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Static(_) => "static",
            Rule::Ai(_) => "ai",
        }
    }

    /// AI rules carry a fixed severity; static ones take it from config.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Rule::Static(_) => None,
            Rule::Ai(r) => Some(r.severity),
        }
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    ai: Vec<AiRule>,
}

impl Registry {
    /// All built-in AI rules.
    pub fn builtin() -> Self {
        let ids: Vec<String> = BUILTIN_IDS.iter().map(|s| s.to_string()).collect();
        Self::from_builtin_ids(&ids)
    }

    fn from_builtin_ids(ids: &[String]) -> Self {
        let mut reg = Self::default();
        for id in ids {
            match builtin::builtin(id) {
                Some(rule) => {
                    if reg.contains(id) {
                        warn!(rule = %id, "AI rule listed twice; ignored");
                    } else {
                        reg.ai.push(rule);
                    }
                }
                None => warn!(rule = %id, "unknown built-in AI rule; ignored"),
            }
        }
        reg
    }

    /// Enabled built-ins followed by custom rules, in config order.
    pub fn load(ai_rule_ids: &[String], custom: &[CustomRuleConfig], root: &Path) -> Result<Self> {
        let mut reg = Self::from_builtin_ids(ai_rule_ids);
        for cfg in custom {
            reg.register(load_custom_rule(root, cfg)?)?;
        }
        Ok(reg)
    }

    /// Add an AI rule. Ids must be unique across static and AI rules.
    pub fn register(&mut self, rule: AiRule) -> Result<()> {
        if self.contains(&rule.id) || STATIC_RULES.iter().any(|r| r.id == rule.id) {
            return Err(LintError::CustomRule {
                id: rule.id,
                message: "a rule with this id already exists".into(),
            });
        }
        self.ai.push(rule);
        Ok(())
    }

    fn contains(&self, id: &str) -> bool {
        self.ai.iter().any(|r| r.id == id)
    }

    pub fn ai_rules(&self) -> &[AiRule] {
        &self.ai
    }

    /// Static rules first, then AI rules, in execution order.
    pub fn rules(&self) -> Vec<Rule<'_>> {
        STATIC_RULES
            .iter()
            .map(|r| Rule::Static(r))
            .chain(self.ai.iter().map(|r| Rule::Ai(r)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::schema::{issues_document, ResponseSchema};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn rule(id: &str) -> AiRule {
        let schema = issues_document(json!({ "problem": { "type": "string" } }), &["problem"]);
        AiRule::new(
            id,
            "d",
            Severity::Info,
            ResponseSchema::compile(schema).unwrap(),
            |_| String::new(),
        )
    }

    #[test]
    fn test_builtin_lists_every_rule_in_order() {
        let reg = Registry::builtin();
        let ids: Vec<_> = reg.rules().iter().map(|r| r.id()).collect();
        assert_eq!(
            ids,
            vec![
                "naming-convention",
                "raw-color",
                "raw-pixel",
                "semantic-naming",
                "spacing-consistency",
                "design-complexity"
            ]
        );
        assert_eq!(reg.rules()[0].kind(), "static");
        assert_eq!(reg.rules()[5].severity(), Some(Severity::Info));
    }

    #[test]
    fn test_load_subset_skips_unknown_ids() {
        let ids = vec!["design-complexity".to_string(), "bogus".to_string()];
        let reg = Registry::load(&ids, &[], Path::new(".")).unwrap();
        assert_eq!(reg.ai_rules().len(), 1);
        assert_eq!(reg.ai_rules()[0].id, "design-complexity");
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut reg = Registry::builtin();
        assert!(reg.register(rule("semantic-naming")).is_err());
        assert!(reg.register(rule("raw-color")).is_err());
        assert!(reg.register(rule("brand")).is_ok());
        assert!(reg.register(rule("brand")).is_err());
    }

    #[test]
    fn test_load_with_custom_rule_files() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("p.txt"), "Review {{TOKENS}}").unwrap();
        fs::write(
            td.path().join("s.yml"),
            "type: object\nproperties:\n  issues:\n    type: array\n    items:\n      properties:\n        problem:\n          type: string\n",
        )
        .unwrap();
        let custom = vec![CustomRuleConfig {
            id: "brand".into(),
            description: None,
            severity: None,
            prompt: "p.txt".into(),
            schema: "s.yml".into(),
            export: None,
        }];
        let reg = Registry::load(&[], &custom, td.path()).unwrap();
        assert_eq!(reg.ai_rules()[0].id, "brand");
        assert_eq!(reg.ai_rules()[0].severity, Severity::Warn);

        let missing = vec![CustomRuleConfig {
            prompt: "nope.txt".into(),
            ..custom[0].clone()
        }];
        assert!(Registry::load(&[], &missing, td.path()).is_err());
    }
}
