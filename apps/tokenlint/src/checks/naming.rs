//! `naming-convention`: token names must match a configured regex.

use super::RuleError;
use crate::models::rule::RuleSettings;
use crate::models::token::{CodeFile, Token};
use crate::models::Diagnostic;
use regex::Regex;

pub const RULE_ID: &str = "naming-convention";

/// Both `severity` and `pattern` are required; there is no default.
pub fn check(
    tokens: &[Token],
    settings: &RuleSettings,
    _code_files: &[CodeFile],
) -> Result<Vec<Diagnostic>, RuleError> {
    let severity = settings
        .severity
        .ok_or(RuleError::MissingSetting("severity"))?;
    let pattern = settings
        .pattern
        .as_deref()
        .ok_or(RuleError::MissingSetting("pattern"))?;
    let re = Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut out = Vec::new();
    for t in tokens.iter().filter(|t| !re.is_match(&t.name)) {
        let mut d = Diagnostic::new(
            RULE_ID,
            severity,
            format!(
                "Token name \"{}\" does not match naming pattern {}",
                t.name, pattern
            ),
        );
        d.token_name = Some(t.name.clone());
        d.suggestion = Some(suggest_name(&t.name));
        out.push(d);
    }
    Ok(out)
}

/// Best-effort normalized name: lowercase, whitespace and underscores as
/// hyphens.
pub fn suggest_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.trim().chars() {
        if c.is_whitespace() || c == '_' {
            pending_dash = true;
            continue;
        }
        if pending_dash {
            out.push('-');
            pending_dash = false;
        }
        out.extend(c.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use serde_json::json;

    const PATTERN: &str = r"^([a-z]+\.)+[a-z0-9-]+$";

    fn settings() -> RuleSettings {
        RuleSettings::new(Severity::Error).with_pattern(PATTERN)
    }

    #[test]
    fn test_matching_name_is_clean() {
        let tokens = vec![Token::new("color.primary", json!("#ff0000"), Some("color"))];
        assert!(check(&tokens, &settings(), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_mismatch_emits_one_diagnostic_with_suggestion() {
        let tokens = vec![Token::new("Color Primary", json!("#fff"), None)];
        let out = check(&tokens, &settings(), &[]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rule_id, RULE_ID);
        assert_eq!(out[0].severity, Severity::Error);
        assert_eq!(out[0].token_name.as_deref(), Some("Color Primary"));
        assert_eq!(out[0].suggestion.as_deref(), Some("color-primary"));
    }

    #[test]
    fn test_suggestion_has_no_uppercase_underscores_or_whitespace() {
        for name in ["Brand_Primary Color", "  spacing__XL ", "a\tb_c"] {
            let s = suggest_name(name);
            assert_eq!(s, s.to_lowercase());
            assert!(!s.contains('_'));
            assert!(!s.chars().any(char::is_whitespace));
        }
        assert_eq!(suggest_name("Brand_Primary Color"), "brand-primary-color");
    }

    #[test]
    fn test_requires_severity_and_valid_pattern() {
        let tokens = vec![Token::new("x", json!(1), None)];
        let no_sev = RuleSettings::default().with_pattern(PATTERN);
        assert!(matches!(
            check(&tokens, &no_sev, &[]),
            Err(RuleError::MissingSetting("severity"))
        ));
        let no_pat = RuleSettings::new(Severity::Warn);
        assert!(matches!(
            check(&tokens, &no_pat, &[]),
            Err(RuleError::MissingSetting("pattern"))
        ));
        let bad = RuleSettings::new(Severity::Warn).with_pattern("([a-z");
        assert!(matches!(
            check(&tokens, &bad, &[]),
            Err(RuleError::InvalidPattern { .. })
        ));
    }
}
