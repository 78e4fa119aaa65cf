//! Gemini provider (`generateContent` in JSON mode).

use super::{send_json, CompletionRequest, LlmError, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value as Json;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

pub struct GeminiProvider {
    client: Client,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    fn build_request<'a>(request: &'a CompletionRequest) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &request.system,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.2,
            },
        }
    }
}

/// Concatenated text parts of the first candidate; empty when absent.
fn extract_text(body: &Json) -> String {
    body.pointer("/candidates/0/content/parts")
        .and_then(Json::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Json::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/models/{}:generateContent", API_BASE_URL, request.model);
        let builder = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
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
    fn test_request_body_uses_json_mode_and_system_instruction() {
        let req = CompletionRequest::new("gemini-2.5-flash", "lint these");
        let body = serde_json::to_value(GeminiProvider::build_request(&req)).unwrap();
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "lint these");
        assert!(body["systemInstruction"].get("role").is_none());
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("JSON"));
    }

    #[test]
    fn test_extract_text_joins_parts_and_tolerates_missing() {
        let body = json!({"candidates":[{"content":{"parts":[{"text":"{\"iss"},{"text":"ues\":[]}"}]}}]});
        assert_eq!(extract_text(&body), "{\"issues\":[]}");
        assert_eq!(extract_text(&json!({"candidates": []})), "");
    }
}
