//! Model fallback as an explicit state machine.
//!
//! Each attempt produces a `ModelAttemptResult`; `run_with_fallback` walks
//! the provider's ordered candidate list and decides whether to stop or
//! advance. Error classification is kept out of the driver.

use super::response::parse_payload;
use super::AiRuleError;
use crate::llm::{CompletionRequest, LlmError, LlmProvider, ProviderKind};
use serde_json::Value as Json;
use std::future::Future;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Quota exhausted or rate limited
    Quota,
    /// Model missing or unsupported for this key
    ModelUnavailable,
    Other,
}

const QUOTA_CODES: &[&str] = &[
    "resource_exhausted",
    "rate_limit_exceeded",
    "insufficient_quota",
];
const UNAVAILABLE_CODES: &[&str] = &["not_found", "model_not_found"];
const QUOTA_HINTS: &[&str] = &[
    "quota",
    "rate limit",
    "rate_limit",
    "resource_exhausted",
    "too many requests",
];
const UNAVAILABLE_HINTS: &[&str] = &["not found", "not_found", "not supported", "does not exist"];

/// Structured status and code first; message substrings only as a fallback.
pub fn classify_error(e: &LlmError) -> ErrorClass {
    match e.status() {
        Some(429) => return ErrorClass::Quota,
        Some(404) => return ErrorClass::ModelUnavailable,
        _ => {}
    }
    if let Some(code) = e.code().map(str::to_ascii_lowercase) {
        if QUOTA_CODES.contains(&code.as_str()) {
            return ErrorClass::Quota;
        }
        if UNAVAILABLE_CODES.contains(&code.as_str()) {
            return ErrorClass::ModelUnavailable;
        }
    }
    let msg = e.to_string().to_ascii_lowercase();
    if QUOTA_HINTS.iter().any(|h| msg.contains(h)) {
        ErrorClass::Quota
    } else if UNAVAILABLE_HINTS.iter().any(|h| msg.contains(h)) {
        ErrorClass::ModelUnavailable
    } else {
        ErrorClass::Other
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelAttemptResult {
    /// Parsed JSON payload
    Success(Json),
    /// Environmental failure; always advance to the next model
    Transient(String),
    /// Stops the rule when the model was pinned; advances otherwise
    Fatal(String),
}

/// Ordered models to try for one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPlan {
    pub models: Vec<String>,
    pub pinned: bool,
}

impl ModelPlan {
    /// The provider's fallback list, or just the pinned model.
    pub fn for_provider(provider: ProviderKind, pinned: Option<&str>) -> Self {
        match pinned.map(str::trim).filter(|m| !m.is_empty()) {
            Some(model) => Self::pinned(model),
            None => Self::fallback(provider.default_models().iter().copied()),
        }
    }

    pub fn pinned(model: impl Into<String>) -> Self {
        Self {
            models: vec![model.into()],
            pinned: true,
        }
    }

    pub fn fallback<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: models.into_iter().map(Into::into).collect(),
            pinned: false,
        }
    }
}

/// One structured-JSON request against one model.
pub async fn attempt_model(
    provider: &dyn LlmProvider,
    model: String,
    prompt: &str,
) -> ModelAttemptResult {
    let request = CompletionRequest::new(model, prompt);
    match provider.complete(&request).await {
        Ok(text) if text.trim().is_empty() => {
            ModelAttemptResult::Fatal(format!("model '{}' returned an empty response", request.model))
        }
        Ok(text) => match parse_payload(&text) {
            Ok(v) => ModelAttemptResult::Success(v),
            Err(e) => ModelAttemptResult::Fatal(format!("response is not valid JSON: {}", e)),
        },
        Err(e) => match classify_error(&e) {
            ErrorClass::Quota => ModelAttemptResult::Transient(format!("quota/rate limit: {}", e)),
            ErrorClass::ModelUnavailable => {
                ModelAttemptResult::Transient(format!("model unavailable: {}", e))
            }
            ErrorClass::Other => ModelAttemptResult::Fatal(e.to_string()),
        },
    }
}

/// Successful attempt: which model answered and what it said.
#[derive(Debug)]
pub struct Answer {
    pub model: String,
    pub payload: Json,
}

/// Drive `attempt` across the plan until one model succeeds.
pub async fn run_with_fallback<F, Fut>(plan: &ModelPlan, mut attempt: F) -> Result<Answer, AiRuleError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ModelAttemptResult>,
{
    let mut last: Option<String> = None;
    for model in &plan.models {
        debug!(model = %model, "requesting completion");
        match attempt(model.clone()).await {
            ModelAttemptResult::Success(payload) => {
                return Ok(Answer {
                    model: model.clone(),
                    payload,
                })
            }
            ModelAttemptResult::Transient(reason) => {
                warn!(model = %model, reason = %reason, "model unavailable; trying next candidate");
                last = Some(reason);
            }
            ModelAttemptResult::Fatal(reason) if plan.pinned => {
                return Err(AiRuleError::Pinned {
                    model: model.clone(),
                    reason,
                });
            }
            ModelAttemptResult::Fatal(reason) => {
                warn!(model = %model, reason = %reason, "model failed; trying next candidate");
                last = Some(reason);
            }
        }
    }
    Err(AiRuleError::Exhausted {
        attempted: plan.models.join(", "),
        last: last.unwrap_or_else(|| "no models configured".to_string()),
    })
}
