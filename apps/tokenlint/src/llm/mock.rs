//! Mock provider with queued canned responses.
//!
//! No network calls. Responses are consumed in order; an empty queue is an
//! error so misconfigured tests fail loudly.

use super::{CompletionRequest, LlmError, LlmProvider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful text payload.
    pub fn respond(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue an error.
    pub fn fail(self, error: LlmError) -> Self {
        self.push(Err(error));
        self
    }

    pub fn push(&self, response: Result<String, LlmError>) {
        if let Ok(mut q) = self.responses.lock() {
            q.push_back(response);
        }
    }

    /// Models requested so far, in call order.
    pub fn models_requested(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.iter().map(|req| req.model.clone()).collect())
            .unwrap_or_default()
    }

    /// Prompts sent so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.iter().map(|req| req.prompt.clone()).collect())
            .unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|q| q.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        if let Ok(mut r) = self.requests.lock() {
            r.push(request.clone());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| {
                Err(LlmError::InvalidResponse(
                    "mock provider has no queued response".into(),
                ))
            })
    }
}

/// Convenience constructor for a status error in tests.
pub fn status(status: u16, message: &str) -> LlmError {
    LlmError::Status {
        provider: "mock".into(),
        status,
        code: None,
        message: message.into(),
    }
}
