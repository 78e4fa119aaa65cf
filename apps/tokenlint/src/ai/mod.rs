//! AI rule runner.
//!
//! Rules run strictly one after another against a single provider. Each
//! rule filters its candidates, builds a prompt, walks the model fallback
//! plan, validates the response and maps issues to diagnostics. A failing
//! rule is logged and skipped; it never aborts the run.

pub mod builtin;
pub mod custom;
pub mod fallback;
pub mod prompt;
pub mod response;
pub mod schema;

use crate::llm::{credentials_from_env, provider_for, LlmProvider, ProviderKind};
use crate::models::token::{CodeFile, LintContext, Token};
use crate::models::{Diagnostic, Severity};
use fallback::{attempt_model, run_with_fallback, ModelPlan};
use schema::{ResponseSchema, SchemaViolation};
use serde_json::Value as Json;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why one AI rule produced no diagnostics.
#[derive(Debug, Error)]
pub enum AiRuleError {
    #[error("pinned model '{model}' failed: {reason}")]
    Pinned { model: String, reason: String },

    #[error("all models failed ({attempted}); last error: {last}")]
    Exhausted { attempted: String, last: String },

    #[error("response from '{model}' failed schema validation: {}", response::join(.violations))]
    Schema {
        model: String,
        violations: Vec<SchemaViolation>,
    },
}

impl AiRuleError {
    /// Short class name for logs.
    pub fn class(&self) -> &'static str {
        match self {
            AiRuleError::Pinned { .. } => "pinned-model",
            AiRuleError::Exhausted { .. } => "fallback-exhausted",
            AiRuleError::Schema { .. } => "schema",
        }
    }
}

pub type PromptBuilder = Box<dyn Fn(&LintContext<'_>) -> String + Send + Sync>;
pub type TokenFilter = fn(&Token) -> bool;
pub type Summarize = fn(&AiRule, &Json) -> Option<Diagnostic>;

/// An LLM-backed rule.
pub struct AiRule {
    pub id: String,
    pub description: String,
    pub severity: Severity,
    pub prompt: PromptBuilder,
    pub schema: ResponseSchema,
    /// Narrows the candidate tokens; an empty result skips the rule.
    pub token_filter: Option<TokenFilter>,
    /// Turns rule-level response fields into one extra diagnostic.
    pub summarize: Option<Summarize>,
}

impl AiRule {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        schema: ResponseSchema,
        prompt: impl Fn(&LintContext<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            severity,
            prompt: Box::new(prompt),
            schema,
            token_filter: None,
            summarize: None,
        }
    }

    pub fn with_token_filter(mut self, filter: TokenFilter) -> Self {
        self.token_filter = Some(filter);
        self
    }

    pub fn with_summary(mut self, summarize: Summarize) -> Self {
        self.summarize = Some(summarize);
        self
    }
}

impl fmt::Debug for AiRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiRule")
            .field("id", &self.id)
            .field("severity", &self.severity)
            .field("schema", &self.schema)
            .field("token_filter", &self.token_filter.is_some())
            .finish_non_exhaustive()
    }
}

/// Caller-supplied provider options.
#[derive(Debug, Clone, Default)]
pub struct AiOptions {
    pub api_key: Option<String>,
    pub provider: Option<ProviderKind>,
    /// Pins a single model instead of the provider's fallback list.
    pub model: Option<String>,
}

/// Resolve credentials from options and environment, then run `rules`.
/// Missing credentials skip the AI layer without error.
pub async fn run_ai_rules(
    tokens: &[Token],
    rules: &[AiRule],
    options: &AiOptions,
    code_files: &[CodeFile],
) -> Vec<Diagnostic> {
    if rules.is_empty() || tokens.is_empty() {
        debug!("no AI rules or candidates; skipping AI layer");
        return Vec::new();
    }
    let Some(credentials) = credentials_from_env(options.api_key.as_deref(), options.provider)
    else {
        info!("no LLM API key found (GEMINI_API_KEY, OPENAI_API_KEY); skipping AI rules");
        return Vec::new();
    };
    let provider = provider_for(&credentials);
    let plan = ModelPlan::for_provider(credentials.provider, options.model.as_deref());
    run_ai_rules_with(provider.as_ref(), &plan, tokens, rules, code_files).await
}

/// Run `rules` sequentially against an already-built provider.
pub async fn run_ai_rules_with(
    provider: &dyn LlmProvider,
    plan: &ModelPlan,
    tokens: &[Token],
    rules: &[AiRule],
    code_files: &[CodeFile],
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if tokens.is_empty() {
        return out;
    }
    for rule in rules {
        match run_rule(provider, plan, rule, tokens, code_files).await {
            Ok(Some(found)) => {
                debug!(rule = %rule.id, count = found.len(), "AI rule finished");
                out.extend(found);
            }
            Ok(None) => {}
            Err(e) => warn!(
                rule = %rule.id,
                provider = provider.name(),
                class = e.class(),
                models = %plan.models.join(", "),
                error = %e,
                "AI rule failed; skipping"
            ),
        }
    }
    out
}

async fn run_rule(
    provider: &dyn LlmProvider,
    plan: &ModelPlan,
    rule: &AiRule,
    tokens: &[Token],
    code_files: &[CodeFile],
) -> Result<Option<Vec<Diagnostic>>, AiRuleError> {
    let filtered: Vec<Token>;
    let candidates = match rule.token_filter {
        Some(keep) => {
            filtered = tokens.iter().filter(|t| keep(t)).cloned().collect();
            &filtered[..]
        }
        None => tokens,
    };
    if candidates.is_empty() {
        debug!(rule = %rule.id, "no matching tokens; rule skipped");
        return Ok(None);
    }

    let ctx = LintContext::new(candidates, code_files);
    let prompt = (rule.prompt)(&ctx);
    let prompt: &str = &prompt;
    let answer = run_with_fallback(plan, move |model| attempt_model(provider, model, prompt)).await?;

    let accepted = response::accept(&rule.schema, answer.payload).map_err(|violations| {
        AiRuleError::Schema {
            model: answer.model.clone(),
            violations,
        }
    })?;
    let mut found: Vec<Diagnostic> = accepted
        .issues
        .iter()
        .map(|entry| response::issue_to_diagnostic(rule, entry))
        .collect();
    if let Some(summarize) = rule.summarize {
        found.extend(summarize(rule, &accepted.payload));
    }
    debug!(rule = %rule.id, model = %answer.model, "model answered");
    Ok(Some(found))
}
