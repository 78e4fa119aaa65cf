//! LLM provider abstraction.
//!
//! Two provider families are supported, both driven in JSON mode:
//! - Gemini (`GEMINI_API_KEY`)
//! - OpenAI (`OPENAI_API_KEY`)
//!
//! Providers only move text. Error classification, model fallback and
//! response parsing live in `crate::ai`.

pub mod gemini;
pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as Json;
use std::fmt;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised by a single completion request.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider answered with a non-success status
    #[error("{provider} HTTP {status}: {message}")]
    Status {
        provider: String,
        status: u16,
        /// Structured error code from the body (`RESOURCE_EXHAUSTED`, `model_not_found`, ...)
        code: Option<String>,
        message: String,
    },

    /// Request never produced a response
    #[error("{provider} transport error: {message}")]
    Transport { provider: String, message: String },

    /// Response envelope did not have the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            LlmError::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

// =============================================================================
// Provider Selection
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
/// Supported provider families.
pub enum ProviderKind {
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    /// Resolution order when no explicit key is given.
    pub const PRECEDENCE: [ProviderKind; 2] = [ProviderKind::Gemini, ProviderKind::OpenAi];

    pub fn parse(s: &str) -> Option<ProviderKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(ProviderKind::Gemini),
            "openai" => Some(ProviderKind::OpenAi),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
        }
    }

    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Ordered fallback model list.
    pub fn default_models(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Gemini => &["gemini-2.5-flash", "gemini-2.0-flash", "gemini-1.5-flash"],
            ProviderKind::OpenAi => &["gpt-4o-mini", "gpt-4.1-mini", "gpt-4o"],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider plus the key to call it with.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub provider: ProviderKind,
    pub api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// First match wins:
/// 1. explicit key, with the requested provider (Gemini when unspecified);
/// 2. `GEMINI_API_KEY`, then `OPENAI_API_KEY`.
///
/// The requested provider only applies to an explicit key.
///
/// `None` means the AI layer is skipped.
pub fn resolve_credentials(
    api_key: Option<&str>,
    provider: Option<ProviderKind>,
    env: impl Fn(&str) -> Option<String>,
) -> Option<Credentials> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    if let Some(key) = non_empty(api_key.map(str::to_string)) {
        return Some(Credentials {
            provider: provider.unwrap_or(ProviderKind::Gemini),
            api_key: key,
        });
    }
    for kind in ProviderKind::PRECEDENCE {
        if let Some(key) = non_empty(env(kind.env_var())) {
            return Some(Credentials {
                provider: kind,
                api_key: key,
            });
        }
    }
    None
}

/// Credentials from the process environment.
pub fn credentials_from_env(
    api_key: Option<&str>,
    provider: Option<ProviderKind>,
) -> Option<Credentials> {
    resolve_credentials(api_key, provider, |name| std::env::var(name).ok())
}

// =============================================================================
// Provider Trait
// =============================================================================

/// Fixed system instruction for every rule request.
pub const SYSTEM_INSTRUCTION: &str = "You are a meticulous design-system auditor. \
You review design tokens and the code that consumes them. \
Respond with a single JSON object only, no prose and no markdown.";

/// One JSON-mode chat completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: SYSTEM_INSTRUCTION.to_string(),
            prompt: prompt.into(),
        }
    }
}

/// A structured-JSON completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs (e.g. "gemini")
    fn name(&self) -> &str;

    /// Send one request and return the raw text payload (possibly empty).
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Build the HTTP-backed provider for resolved credentials.
pub fn provider_for(credentials: &Credentials) -> Box<dyn LlmProvider> {
    match credentials.provider {
        ProviderKind::Gemini => Box::new(gemini::GeminiProvider::new(&credentials.api_key)),
        ProviderKind::OpenAi => Box::new(openai::OpenAiProvider::new(&credentials.api_key)),
    }
}

// =============================================================================
// HTTP Helpers
// =============================================================================

/// Send a request and decode the JSON body, mapping failures to `LlmError`.
pub(crate) async fn send_json(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<Json, LlmError> {
    let response = request.send().await.map_err(|e| LlmError::Transport {
        provider: provider.to_string(),
        message: e.to_string(),
    })?;
    let status = response.status();
    let body = response.text().await.map_err(|e| LlmError::Transport {
        provider: provider.to_string(),
        message: e.to_string(),
    })?;
    if !status.is_success() {
        return Err(status_error(provider, status.as_u16(), &body));
    }
    serde_json::from_str(&body)
        .map_err(|e| LlmError::InvalidResponse(format!("{} returned non-JSON body: {}", provider, e)))
}

/// Decode `{"error": {...}}` envelopes from either provider family.
pub(crate) fn status_error(provider: &str, status: u16, body: &str) -> LlmError {
    let parsed: Option<Json> = serde_json::from_str(body).ok();
    let err = parsed.as_ref().and_then(|v| v.get("error"));
    let message = err
        .and_then(|e| e.get("message"))
        .and_then(Json::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string());
    let code = err.and_then(|e| {
        ["status", "code", "type"]
            .iter()
            .find_map(|k| e.get(*k).and_then(Json::as_str))
            .map(str::to_string)
    });
    LlmError::Status {
        provider: provider.to_string(),
        status,
        code,
        message,
    }
}
