//! Lint runner: static rules, candidate selection, then AI rules.
//!
//! Produces a `LintReport` with issues and a summary. Issues keep
//! generation order (static rules first, then AI rules in registry order);
//! nothing is sorted or de-duplicated.

use crate::ai::fallback::ModelPlan;
use crate::ai::{run_ai_rules, run_ai_rules_with, AiOptions};
use crate::candidates::{selector_for, CandidateSelector};
use crate::checks::run_static_rules;
use crate::config::Effective;
use crate::error::Result;
use crate::files::load_code_files;
use crate::llm::LlmProvider;
use crate::models::rule::RuleConfig;
use crate::models::token::{CodeFile, Token};
use crate::models::LintReport;
use crate::registry::Registry;
use crate::tokens::load_tokens;
use tracing::{debug, info};

/// How the AI layer reaches a model.
pub enum AiStage<'a> {
    Disabled,
    /// Resolve credentials from options and the environment.
    Env(&'a AiOptions),
    /// Use an already-built provider and plan.
    Provider {
        provider: &'a dyn LlmProvider,
        plan: &'a ModelPlan,
    },
}

/// Run the full diagnostic pipeline over loaded inputs.
pub async fn run_pipeline(
    tokens: &[Token],
    code_files: &[CodeFile],
    rules: &RuleConfig,
    registry: &Registry,
    selector: &dyn CandidateSelector,
    ai: AiStage<'_>,
) -> LintReport {
    let mut issues = run_static_rules(tokens, rules, code_files);
    debug!(count = issues.len(), "static rules finished");

    if matches!(ai, AiStage::Disabled) || registry.ai_rules().is_empty() {
        return LintReport::new(issues);
    }
    let candidates = selector.select(tokens, &issues);
    if candidates.is_empty() {
        debug!("no AI candidates; skipping AI rules");
        return LintReport::new(issues);
    }
    debug!(candidates = candidates.len(), "running AI rules");
    let found = match ai {
        AiStage::Env(options) => {
            run_ai_rules(&candidates, registry.ai_rules(), options, code_files).await
        }
        AiStage::Provider { provider, plan } => {
            run_ai_rules_with(provider, plan, &candidates, registry.ai_rules(), code_files).await
        }
        AiStage::Disabled => Vec::new(),
    };
    issues.extend(found);
    LintReport::new(issues)
}

/// Load inputs described by `eff` and run the pipeline.
///
/// Token file, code file patterns, and custom rule files must all be
/// usable; any failure there is returned as an error before linting.
pub async fn run_lint(eff: &Effective) -> Result<LintReport> {
    let root = &eff.repo_root;
    let tokens = load_tokens(&root.join(&eff.tokens))?;
    let code_files = load_code_files(root, &eff.files)?;
    let registry = Registry::load(&eff.ai_rules, &eff.custom_rules, root)?;
    let selector = selector_for(eff.candidates, eff.max_candidates);
    info!(
        tokens = tokens.len(),
        files = code_files.len(),
        ai_rules = registry.ai_rules().len(),
        "starting lint"
    );
    let stage = if eff.ai_enabled {
        AiStage::Env(&eff.ai)
    } else {
        AiStage::Disabled
    };
    Ok(run_pipeline(
        &tokens,
        &code_files,
        &eff.rules,
        &registry,
        selector.as_ref(),
        stage,
    )
    .await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::{Flagged, SelectAll};
    use crate::config::{resolve_effective, Overrides};
    use crate::error::LintError;
    use crate::llm::mock::MockProvider;
    use crate::models::Severity;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn write_fixture(root: &std::path::Path, css: &str) {
        fs::write(
            root.join("tokens.json"),
            r##"{
  "color": {
    "$type": "color",
    "primary": { "$value": "#ff0000" },
    "Accent_Blue": { "$value": "#4285f5" }
  },
  "spacing": { "sm": { "value": "8px" } }
}"##,
        )
        .unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/app.css"), css).unwrap();
        fs::write(
            root.join("tokenlint.toml"),
            "files = [\"src/**/*.css\"]\n[ai]\nenabled = false\n",
        )
        .unwrap();
    }

    fn eff(root: &std::path::Path) -> Effective {
        resolve_effective(&Overrides {
            repo_root: root.to_str().map(str::to_string),
            ..Overrides::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_lint_end_to_end_static_only() {
        let td = tempdir().unwrap();
        write_fixture(
            td.path(),
            ".a {\n  color: #FF0000;\n  color: #4285F4;\n  margin: 8px;\n  padding: 13px;\n}\n",
        );
        let report = run_lint(&eff(td.path())).await.unwrap();

        let ids: Vec<_> = report.issues.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["naming-convention", "raw-color", "raw-pixel"]);

        let naming = &report.issues[0];
        assert_eq!(naming.severity, Severity::Error);
        assert_eq!(naming.token_name.as_deref(), Some("color.Accent_Blue"));

        let color = &report.issues[1];
        assert_eq!(color.file.as_deref(), Some("src/app.css"));
        assert_eq!(color.line, Some(3));
        assert_eq!(color.suggested_token.as_deref(), Some("color.Accent_Blue"));

        assert_eq!(report.issues[2].line, Some(5));
        assert!(report.has_errors());
        assert_eq!(report.summary.total, 3);
    }

    #[tokio::test]
    async fn test_missing_token_file_is_fatal() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("tokenlint.toml"), "tokens = \"nope.json\"\n").unwrap();
        let err = run_lint(&eff(td.path())).await.unwrap_err();
        assert!(matches!(err, LintError::Read { .. }));
    }

    #[tokio::test]
    async fn test_pipeline_appends_ai_after_static() {
        let tokens = vec![
            Token::new("color.primary", json!("#ff0000"), None),
            Token::new("Color Secondary", json!("#00ff00"), None),
        ];
        let mut rules = RuleConfig::new();
        rules.insert(
            "naming-convention".into(),
            crate::models::rule::RuleSettings::new(Severity::Error)
                .with_pattern(r"^([a-z]+\.)+[a-z0-9-]+$"),
        );
        let registry = Registry::load(&["semantic-naming".to_string()], &[], std::path::Path::new("."))
            .unwrap();
        let mock = MockProvider::new().respond(
            r#"[{"tokenName": "Color Secondary", "suggestion": "color.secondary", "impact": "Medium"}]"#,
        );
        let plan = ModelPlan::fallback(["m1"]);
        let report = run_pipeline(
            &tokens,
            &[],
            &rules,
            &registry,
            &Flagged,
            AiStage::Provider {
                provider: &mock,
                plan: &plan,
            },
        )
        .await;

        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.issues[0].rule_id, "naming-convention");
        assert_eq!(report.issues[0].suggestion.as_deref(), Some("color-secondary"));
        assert_eq!(report.issues[1].rule_id, "semantic-naming");
        // flagged policy only forwards the token the static rule reported
        let prompt = &mock.prompts()[0];
        assert!(prompt.contains("Color Secondary"));
        assert!(!prompt.contains("color.primary"));
    }

    #[tokio::test]
    async fn test_disabled_stage_makes_no_requests() {
        let tokens = vec![Token::new("color.primary", json!("#ff0000"), None)];
        let mock = MockProvider::new();
        let report = run_pipeline(
            &tokens,
            &[],
            &RuleConfig::new(),
            &Registry::builtin(),
            &SelectAll,
            AiStage::Disabled,
        )
        .await;
        assert!(report.issues.is_empty());
        assert!(mock.models_requested().is_empty());
    }
}
