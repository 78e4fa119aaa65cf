//! Candidate selection: which tokens are forwarded to the AI layer.
//!
//! Callers depend only on `CandidateSelector`, so filtering or capping
//! policies can be swapped in from config without touching the pipeline.

use crate::models::token::Token;
use crate::models::Diagnostic;
use serde::Deserialize;
use std::collections::HashSet;

/// Policy choosing the tokens sent to AI rules.
pub trait CandidateSelector {
    fn select(&self, tokens: &[Token], static_diagnostics: &[Diagnostic]) -> Vec<Token>;
}

/// Identity policy: every token is a candidate.
pub struct SelectAll;

impl CandidateSelector for SelectAll {
    fn select(&self, tokens: &[Token], _static_diagnostics: &[Diagnostic]) -> Vec<Token> {
        tokens.to_vec()
    }
}

/// Only tokens named by a static diagnostic.
pub struct Flagged;

impl CandidateSelector for Flagged {
    fn select(&self, tokens: &[Token], static_diagnostics: &[Diagnostic]) -> Vec<Token> {
        let flagged: HashSet<&str> = static_diagnostics
            .iter()
            .filter_map(|d| d.token_name.as_deref())
            .collect();
        tokens
            .iter()
            .filter(|t| flagged.contains(t.name.as_str()))
            .cloned()
            .collect()
    }
}

/// Caps the output of an inner policy to keep prompts bounded.
pub struct Capped<S> {
    pub inner: S,
    pub max: usize,
}

impl<S: CandidateSelector> CandidateSelector for Capped<S> {
    fn select(&self, tokens: &[Token], static_diagnostics: &[Diagnostic]) -> Vec<Token> {
        let mut out = self.inner.select(tokens, static_diagnostics);
        out.truncate(self.max);
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Config-level policy name under `[ai].candidates`.
pub enum CandidatePolicy {
    #[default]
    All,
    Flagged,
}

/// Build the selector described by config.
pub fn selector_for(
    policy: CandidatePolicy,
    max: Option<usize>,
) -> Box<dyn CandidateSelector + Send + Sync> {
    match (policy, max) {
        (CandidatePolicy::All, None) => Box::new(SelectAll),
        (CandidatePolicy::All, Some(max)) => Box::new(Capped {
            inner: SelectAll,
            max,
        }),
        (CandidatePolicy::Flagged, None) => Box::new(Flagged),
        (CandidatePolicy::Flagged, Some(max)) => Box::new(Capped {
            inner: Flagged,
            max,
        }),
    }
}
