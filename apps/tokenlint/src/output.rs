//! Output rendering for lint reports.
//!
//! Supports `human` (default), `json` and `markdown`. Renderers are pure and
//! return a `String`; `print_report` and `write_report` do the I/O.

use crate::config::OutputMode;
use crate::error::{LintError, Result};
use crate::models::{Diagnostic, LintReport, Severity};
use owo_colors::OwoColorize;
use serde_json::Value as JsonVal;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const TOKEN_GROUP: &str = "Design tokens";

fn use_colors(mode: OutputMode) -> bool {
    mode == OutputMode::Human && std::env::var_os("NO_COLOR").is_none()
}

/// `{issues, summary}` as a JSON value.
pub fn compose_json(report: &LintReport) -> JsonVal {
    serde_json::to_value(report).unwrap_or(JsonVal::Null)
}

pub fn render_json(report: &LintReport) -> String {
    serde_json::to_string_pretty(&compose_json(report)).unwrap_or_else(|_| "{}".to_string())
}

fn location(d: &Diagnostic) -> String {
    match (&d.file, d.line, d.column) {
        (Some(f), Some(l), Some(c)) => format!("{}:{}:{}", f, l, c),
        (Some(f), Some(l), None) => format!("{}:{}", f, l),
        (Some(f), None, _) => f.clone(),
        (None, _, _) => d.token_name.clone().unwrap_or_else(|| "-".to_string()),
    }
}

fn severity_tag(sev: Severity, color: bool) -> String {
    let (icon, tag) = match sev {
        Severity::Error => ("✖", "⟦error⟧"),
        Severity::Warn => ("▲", "⟦warn⟧"),
        Severity::Info => ("◆", "⟦info⟧"),
    };
    if !color {
        return format!("{} {}", icon, tag);
    }
    match sev {
        Severity::Error => format!("{} {}", icon.red(), tag.red().bold()),
        Severity::Warn => format!("{} {}", icon.yellow(), tag.yellow().bold()),
        Severity::Info => format!("{} {}", icon.blue(), tag.blue().bold()),
    }
}

/// Console report grouped by severity, followed by a summary line.
pub fn render_console(report: &LintReport, color: bool) -> String {
    let mut out = String::new();
    let groups = [
        (Severity::Error, "Errors"),
        (Severity::Warn, "Warnings"),
        (Severity::Info, "Info"),
    ];
    for (sev, title) in groups {
        let items: Vec<&Diagnostic> = report.issues.iter().filter(|d| d.severity == sev).collect();
        if items.is_empty() {
            continue;
        }
        let heading = format!("{} ({})", title, items.len());
        if color {
            let _ = writeln!(out, "{}", heading.bold());
        } else {
            let _ = writeln!(out, "{}", heading);
        }
        for d in items {
            let loc = location(d);
            let loc = if color { loc.bold().to_string() } else { loc };
            let _ = writeln!(
                out,
                "  {} {} ❲{}❳ {}",
                severity_tag(sev, color),
                loc,
                d.rule_id,
                d.message
            );
            if let Some(s) = &d.suggestion {
                let _ = writeln!(out, "      ↳ {}", s);
            }
            if let Some(t) = &d.suggested_token {
                let _ = writeln!(out, "      ↳ token: {}", t);
            }
        }
        out.push('\n');
    }
    let s = &report.summary;
    let summary = format!(
        "Summary: total={} errors={} warnings={} info={}",
        s.total, s.errors, s.warnings, s.info
    );
    if color {
        let _ = writeln!(out, "{}", summary.bold());
    } else {
        let _ = writeln!(out, "{}", summary);
    }
    out
}

/// Markdown suitable for a pull request comment.
pub fn render_markdown(report: &LintReport) -> String {
    let s = &report.summary;
    let mut out = String::from("## Design token lint\n\n");
    out.push_str("| Severity | Count |\n|---|---|\n");
    let _ = writeln!(out, "| Errors | {} |", s.errors);
    let _ = writeln!(out, "| Warnings | {} |", s.warnings);
    let _ = writeln!(out, "| Info | {} |", s.info);
    let _ = writeln!(out, "| **Total** | {} |", s.total);
    if report.issues.is_empty() {
        out.push_str("\nNo issues found.\n");
        return out;
    }

    // groups in first-appearance order
    let mut groups: Vec<(&str, Vec<&Diagnostic>)> = Vec::new();
    for d in &report.issues {
        let key = d.file.as_deref().unwrap_or(TOKEN_GROUP);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, items)) => items.push(d),
            None => groups.push((key, vec![d])),
        }
    }
    for (key, items) in groups {
        if key == TOKEN_GROUP {
            let _ = writeln!(out, "\n### {}\n", key);
        } else {
            let _ = writeln!(out, "\n### `{}`\n", key);
        }
        for d in items {
            let mut head = format!("- **{}** `{}`", d.severity, d.rule_id);
            match (d.line, &d.token_name) {
                (Some(l), _) => {
                    let _ = write!(head, " (line {})", l);
                }
                (None, Some(t)) => {
                    let _ = write!(head, " `{}`", t);
                }
                _ => {}
            }
            let _ = writeln!(out, "{}: {}", head, d.message);
            if let Some(r) = &d.reason {
                let _ = writeln!(out, "  - Reason: {}", r);
            }
            if let Some(sg) = &d.suggestion {
                let _ = writeln!(out, "  - Suggestion: {}", sg);
            }
            if let Some(t) = &d.suggested_token {
                let _ = writeln!(out, "  - Suggested token: `{}`", t);
            }
            if let Some(i) = d.impact {
                let _ = writeln!(out, "  - Impact: {:?}", i);
            }
            if let Some(code) = &d.fixed_code {
                let _ = writeln!(out, "  - Fix:\n    ```\n    {}\n    ```", code.trim());
            }
        }
    }
    out
}

/// Render in the requested mode.
pub fn render(report: &LintReport, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => render_json(report),
        OutputMode::Markdown => render_markdown(report),
        OutputMode::Human => render_console(report, use_colors(mode)),
    }
}

/// Print lint results in the requested format.
pub fn print_report(report: &LintReport, mode: OutputMode) {
    let text = render(report, mode);
    print!("{}", text);
    if !text.ends_with('\n') {
        println!();
    }
}

/// Persist a rendered report, creating parent directories.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    let write_err = |source| LintError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, content).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Impact;
    use tempfile::tempdir;

    fn report() -> LintReport {
        let mut a = Diagnostic::new("naming-convention", Severity::Error, "bad name");
        a.token_name = Some("Color Primary".into());
        a.suggestion = Some("color-primary".into());
        let mut b = Diagnostic::new("raw-color", Severity::Warn, "Raw color \"#123\"");
        b.file = Some("src/a.css".into());
        b.line = Some(3);
        b.column = Some(10);
        b.suggested_token = Some("color.brand".into());
        b.fixed_code = Some("  color: var(--color-brand);".into());
        let mut c = Diagnostic::new("semantic-naming", Severity::Info, "vague");
        c.impact = Some(Impact::Low);
        LintReport::new(vec![a, b, c])
    }

    #[test]
    fn test_json_shape_uses_camel_case_and_omits_absent_fields() {
        let v = compose_json(&report());
        assert_eq!(v["summary"]["total"], 3);
        assert_eq!(v["summary"]["errors"], 1);
        assert_eq!(v["issues"][0]["ruleId"], "naming-convention");
        assert_eq!(v["issues"][1]["suggestedToken"], "color.brand");
        assert!(v["issues"][0].get("file").is_none());
        assert_eq!(v["issues"][2]["impact"], "Low");
    }

    #[test]
    fn test_console_groups_by_severity_without_color() {
        let out = render_console(&report(), false);
        let e = out.find("Errors (1)").unwrap();
        let w = out.find("Warnings (1)").unwrap();
        let i = out.find("Info (1)").unwrap();
        assert!(e < w && w < i);
        assert!(out.contains("src/a.css:3:10 ❲raw-color❳"));
        assert!(out.contains("Color Primary ❲naming-convention❳ bad name"));
        assert!(out.ends_with("Summary: total=3 errors=1 warnings=1 info=1\n"));
    }

    #[test]
    fn test_markdown_groups_by_file_in_appearance_order() {
        let md = render_markdown(&report());
        assert!(md.contains("| **Total** | 3 |"));
        let tokens = md.find("### Design tokens").unwrap();
        let file = md.find("### `src/a.css`").unwrap();
        assert!(tokens < file);
        assert!(md.contains("- **warn** `raw-color` (line 3): Raw color \"#123\""));
        assert!(md.contains("  - Suggested token: `color.brand`"));
        // both token-level diagnostics share one group
        assert_eq!(md.matches("### Design tokens").count(), 1);
    }

    #[test]
    fn test_empty_markdown_says_so() {
        let md = render_markdown(&LintReport::new(Vec::new()));
        assert!(md.ends_with("No issues found.\n"));
    }

    #[test]
    fn test_write_report_creates_parents() {
        let td = tempdir().unwrap();
        let path = td.path().join("out/nested/report.json");
        write_report(&path, &render_json(&report())).unwrap();
        let back: JsonVal = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back["summary"]["warnings"], 1);
    }
}
