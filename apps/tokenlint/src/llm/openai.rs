//! OpenAI provider (`chat/completions` with `json_object` response format).

use super::{send_json, CompletionRequest, LlmError, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value as Json;

const API_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    fn build_request<'a>(request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.2,
        }
    }
}

fn extract_text(body: &Json) -> String {
    body.pointer("/choices/0/message/content")
        .and_then(Json::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let builder = self
            .client
            .post(format!("{}/chat/completions", API_BASE_URL))
            .bearer_auth(&self.api_key)
            .json(&Self::build_request(request));
        let body = send_json(self.name(), builder).await?;
        Ok(extract_text(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let req = CompletionRequest::new("gpt-4o-mini", "lint these");
        let body = serde_json::to_value(OpenAiProvider::build_request(&req)).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "lint these");
    }

    #[test]
    fn test_null_content_is_empty() {
        let body = json!({"choices":[{"message":{"content": null}}]});
        assert_eq!(extract_text(&body), "");
        let body = json!({"choices":[{"message":{"content": "{}"}}]});
        assert_eq!(extract_text(&body), "{}");
    }
}
