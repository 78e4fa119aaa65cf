//! Configuration discovery and effective settings resolution.
//!
//! Tokenlint reads `tokenlint.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config. Defaults:
//! - `tokens`: `tokens.json`
//! - `files`: none (code detectors then see no files)
//! - `output`: `human`
//! - `ai.enabled`: true, `ai.rules`: every built-in AI rule
//! - `ai.candidates`: `all`
//! - `rules`: when no `[rules]` table exists, `naming-convention` (error),
//!   `raw-color` and `raw-pixel` (warn)
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::ai::builtin::BUILTIN_IDS;
use crate::ai::custom::CustomRuleConfig;
use crate::ai::AiOptions;
use crate::candidates::CandidatePolicy;
use crate::checks::{naming, raw_color, raw_pixel};
use crate::error::{LintError, Result};
use crate::llm::ProviderKind;
use crate::models::rule::{RuleConfig, RuleSettings};
use crate::models::Severity;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILES: [&str; 3] = ["tokenlint.toml", "tokenlint.yaml", "tokenlint.yml"];

/// Naming pattern for the built-in rule set, used only when the config has
/// no `[rules]` table. A configured `naming-convention` must set its own.
pub const DEFAULT_NAMING_PATTERN: &str = r"^([a-z0-9]+\.)*[a-z0-9-]+$";

#[derive(Debug, Default, Deserialize, Clone)]
/// AI layer section under `[ai]`.
pub struct AiCfg {
    pub enabled: Option<bool>,
    pub provider: Option<String>,
    pub model: Option<String>,
    /// Built-in AI rule ids to run.
    pub rules: Option<Vec<String>>,
    pub candidates: Option<CandidatePolicy>,
    pub max_candidates: Option<usize>,
    #[serde(default)]
    pub custom: Vec<CustomRuleConfig>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Report file paths under `[report]`.
pub struct ReportCfg {
    pub json: Option<String>,
    pub markdown: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `tokenlint.toml|yaml`.
pub struct TokenlintConfig {
    pub tokens: Option<String>,
    pub files: Option<Vec<String>>,
    pub output: Option<String>,
    #[serde(default)]
    pub rules: Option<RuleConfig>,
    #[serde(default)]
    pub ai: Option<AiCfg>,
    #[serde(default)]
    pub report: Option<ReportCfg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Markdown,
}

impl OutputMode {
    pub fn parse(s: &str) -> Option<OutputMode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Some(OutputMode::Human),
            "json" => Some(OutputMode::Json),
            "markdown" | "md" => Some(OutputMode::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_found: bool,
    pub tokens: String,
    pub files: Vec<String>,
    pub output: OutputMode,
    pub rules: RuleConfig,
    pub ai_enabled: bool,
    pub ai: AiOptions,
    pub ai_rules: Vec<String>,
    pub custom_rules: Vec<CustomRuleConfig>,
    pub candidates: CandidatePolicy,
    pub max_candidates: Option<usize>,
    pub report_json: Option<String>,
    pub report_markdown: Option<String>,
}

/// CLI-provided values; `None` defers to config and defaults.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub repo_root: Option<String>,
    pub tokens: Option<String>,
    pub files: Vec<String>,
    pub output: Option<String>,
    pub report_json: Option<String>,
    pub report_markdown: Option<String>,
    pub no_ai: bool,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `tokenlint.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `TokenlintConfig` from the first config file present under `root`.
///
/// A present but unreadable or malformed file is an error.
pub fn load_config(root: &Path) -> Result<Option<TokenlintConfig>> {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|source| LintError::Read {
            what: "config file",
            path: path.clone(),
            source,
        })?;
        let cfg = if name.ends_with(".toml") {
            toml::from_str(&s).map_err(|e| parse_error(&path, "TOML", e.to_string()))?
        } else {
            serde_yaml::from_str(&s).map_err(|e| parse_error(&path, "YAML", e.to_string()))?
        };
        return Ok(Some(cfg));
    }
    Ok(None)
}

fn parse_error(path: &Path, format: &'static str, message: String) -> LintError {
    LintError::Parse {
        what: "config file",
        path: path.to_path_buf(),
        format,
        message,
    }
}

/// Static rules enabled when the config has no `[rules]` table.
pub fn default_rules() -> RuleConfig {
    let mut rules = RuleConfig::new();
    rules.insert(
        naming::RULE_ID.to_string(),
        RuleSettings::new(Severity::Error).with_pattern(DEFAULT_NAMING_PATTERN),
    );
    rules.insert(raw_color::RULE_ID.to_string(), RuleSettings::new(Severity::Warn));
    rules.insert(raw_pixel::RULE_ID.to_string(), RuleSettings::new(Severity::Warn));
    rules
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides) -> Result<Effective> {
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let loaded = load_config(&repo_root)?;
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();
    let ai_cfg = cfg.ai.unwrap_or_default();
    let report = cfg.report.unwrap_or_default();

    let tokens = cli
        .tokens
        .clone()
        .or(cfg.tokens)
        .unwrap_or_else(|| "tokens.json".to_string());

    let files = if cli.files.is_empty() {
        cfg.files.unwrap_or_default()
    } else {
        cli.files.clone()
    };

    let output_src = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    let output = OutputMode::parse(&output_src).ok_or_else(|| {
        LintError::Config(format!(
            "unknown output mode '{}' (expected human|json|markdown)",
            output_src
        ))
    })?;

    let rules = cfg.rules.unwrap_or_else(default_rules);

    let provider = match cli.provider.as_deref().or(ai_cfg.provider.as_deref()) {
        Some(p) => Some(ProviderKind::parse(p).ok_or_else(|| {
            LintError::Config(format!("unknown AI provider '{}' (expected gemini|openai)", p))
        })?),
        None => None,
    };
    let ai = AiOptions {
        api_key: cli.api_key.clone(),
        provider,
        model: cli.model.clone().or(ai_cfg.model),
    };
    let ai_enabled = !cli.no_ai && ai_cfg.enabled.unwrap_or(true);
    let ai_rules = ai_cfg
        .rules
        .unwrap_or_else(|| BUILTIN_IDS.iter().map(|s| s.to_string()).collect());

    Ok(Effective {
        repo_root,
        config_found,
        tokens,
        files,
        output,
        rules,
        ai_enabled,
        ai,
        ai_rules,
        custom_rules: ai_cfg.custom,
        candidates: ai_cfg.candidates.unwrap_or_default(),
        max_candidates: ai_cfg.max_candidates,
        report_json: cli.report_json.clone().or(report.json),
        report_markdown: cli.report_markdown.clone().or(report.markdown),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn at(root: &Path) -> Overrides {
        Overrides {
            repo_root: root.to_str().map(str::to_string),
            ..Overrides::default()
        }
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("tokenlint.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
tokens = "design/tokens.json"
files = ["src/**/*.css"]
output = "json"

[rules.naming-convention]
severity = "warning"
pattern = "^[a-z.]+$"

[ai]
provider = "openai"
model = "gpt-4o"
rules = ["semantic-naming"]
candidates = "flagged"
max_candidates = 50

[report]
markdown = "out/report.md"
"#
        )
        .unwrap();

        // Resolve using explicit repo_root to avoid global CWD races
        let eff = resolve_effective(&at(root)).unwrap();
        assert!(eff.config_found);
        assert_eq!(eff.tokens, "design/tokens.json");
        assert_eq!(eff.files, vec!["src/**/*.css"]);
        assert_eq!(eff.output, OutputMode::Json);
        assert_eq!(eff.rules.len(), 1);
        assert_eq!(eff.rules["naming-convention"].severity, Some(Severity::Warn));
        assert_eq!(eff.ai.provider, Some(ProviderKind::OpenAi));
        assert_eq!(eff.ai.model.as_deref(), Some("gpt-4o"));
        assert_eq!(eff.ai_rules, vec!["semantic-naming"]);
        assert_eq!(eff.candidates, CandidatePolicy::Flagged);
        assert_eq!(eff.max_candidates, Some(50));
        assert_eq!(eff.report_markdown.as_deref(), Some("out/report.md"));
    }

    #[test]
    fn test_yaml_with_custom_rules() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("tokenlint.yaml"),
            r#"
ai:
  enabled: false
  custom:
    - id: brand-colors
      prompt: rules/brand.txt
      schema: rules/brand.json
      severity: error
"#,
        )
        .unwrap();
        let eff = resolve_effective(&at(root)).unwrap();
        assert!(!eff.ai_enabled);
        assert_eq!(eff.custom_rules.len(), 1);
        assert_eq!(eff.custom_rules[0].severity, Some(Severity::Error));
    }

    #[test]
    fn test_defaults_without_config() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let eff = resolve_effective(&at(dir.path())).unwrap();
        assert!(!eff.config_found);
        assert_eq!(eff.tokens, "tokens.json");
        assert_eq!(eff.output, OutputMode::Human);
        assert!(eff.ai_enabled);
        assert_eq!(eff.ai_rules.len(), BUILTIN_IDS.len());
        assert_eq!(eff.candidates, CandidatePolicy::All);
        assert_eq!(eff.rules, default_rules());
        assert_eq!(
            eff.rules["naming-convention"].pattern.as_deref(),
            Some(DEFAULT_NAMING_PATTERN)
        );
    }

    #[test]
    fn test_cli_takes_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("tokenlint.toml"),
            "tokens = \"a.json\"\noutput = \"json\"\nfiles = [\"x/*\"]\n[ai]\nmodel = \"m\"\n",
        )
        .unwrap();
        let cli = Overrides {
            tokens: Some("b.json".into()),
            output: Some("markdown".into()),
            files: vec!["y/*".into()],
            model: Some("pinned".into()),
            no_ai: true,
            ..at(root)
        };
        let eff = resolve_effective(&cli).unwrap();
        assert_eq!(eff.tokens, "b.json");
        assert_eq!(eff.output, OutputMode::Markdown);
        assert_eq!(eff.files, vec!["y/*"]);
        assert_eq!(eff.ai.model.as_deref(), Some("pinned"));
        assert!(!eff.ai_enabled);
    }

    #[test]
    fn test_rules_table_replaces_defaults_without_pattern_fallback() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("tokenlint.toml"),
            "[rules.naming-convention]\nseverity = \"error\"\n",
        )
        .unwrap();
        let eff = resolve_effective(&at(root)).unwrap();
        assert_eq!(eff.rules.len(), 1);
        assert_eq!(eff.rules["naming-convention"].pattern, None);
        assert!(!eff.rules.contains_key("raw-color"));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("tokenlint.toml"), "output = \"xml\"\n").unwrap();
        assert!(matches!(resolve_effective(&at(root)), Err(LintError::Config(_))));

        fs::write(root.join("tokenlint.toml"), "[ai]\nprovider = \"claude\"\n").unwrap();
        assert!(matches!(resolve_effective(&at(root)), Err(LintError::Config(_))));

        fs::write(root.join("tokenlint.toml"), "tokens = [").unwrap();
        assert!(matches!(resolve_effective(&at(root)), Err(LintError::Parse { .. })));
    }

    #[test]
    fn test_detect_repo_root_walks_up() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("tokenlint.yml"), "tokens: t.json\n").unwrap();
        let nested = root.join("packages/ui");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(detect_repo_root(&nested), root.to_path_buf());
    }
}
