//! Code file discovery for the static detectors and AI prompts.

use crate::error::{LintError, Result};
use crate::models::token::CodeFile;
use glob::glob;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Expand `patterns` relative to `root` and read every matched file.
///
/// Paths are reported relative to `root`, sorted and de-duplicated.
/// Unreadable or non-UTF-8 files are skipped with a warning.
pub fn load_code_files(root: &Path, patterns: &[String]) -> Result<Vec<CodeFile>> {
    let mut targets: BTreeSet<PathBuf> = BTreeSet::new();
    for pat in patterns {
        let abs = root.join(pat);
        let pattern = abs.to_string_lossy().to_string();
        let entries = glob(&pattern).map_err(|e| LintError::Pattern {
            pattern: pat.clone(),
            message: e.to_string(),
        })?;
        for entry in entries.flatten() {
            if entry.is_file() {
                targets.insert(entry);
            }
        }
    }

    let mut out = Vec::with_capacity(targets.len());
    for path in targets {
        match fs::read_to_string(&path) {
            Ok(content) => out.push(CodeFile::new(display_path(root, &path), content)),
            Err(e) => warn!(file = %path.display(), error = %e, "cannot read code file; skipped"),
        }
    }
    debug!(count = out.len(), "loaded code files");
    Ok(out)
}

fn display_path(root: &Path, path: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .replace('\\', "/")
}
