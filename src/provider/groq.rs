// src/provider/groq.rs — Groq chat completions (OpenAI-compatible API)

use async_trait::async_trait;

use super::{ChatProvider, ChatRequest, ChatResponse, ContentPart, Role, TokenUsage};
use crate::infra::errors::RetouchError;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub struct GroqProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GroqProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Point at a different OpenAI-compatible endpoint (self-hosted, test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn provider_err(&self, message: impl Into<String>, retriable: bool) -> RetouchError {
        RetouchError::Provider {
            provider: self.id().into(),
            message: message.into(),
            retriable,
        }
    }
}

/// Encode one message for the wire. A single text part is sent as a plain
/// string; anything else becomes the multi-part array vision models expect.
fn encode_message(role: &Role, parts: &[ContentPart]) -> serde_json::Value {
    let role = match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    let content = match parts {
        [ContentPart::Text(text)] => serde_json::json!(text),
        _ => serde_json::json!(parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => serde_json::json!({
                    "type": "text",
                    "text": text,
                }),
                ContentPart::ImageUrl(url) => serde_json::json!({
                    "type": "image_url",
                    "image_url": { "url": url },
                }),
            })
            .collect::<Vec<_>>()),
    };

    serde_json::json!({ "role": role, "content": content })
}

#[async_trait]
impl ChatProvider for GroqProvider {
    fn id(&self) -> &str {
        "groq"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, RetouchError> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(ref system) = request.system {
            messages.push(serde_json::json!({ "role": "system", "content": system }));
        }
        for m in &request.messages {
            messages.push(encode_message(&m.role, &m.parts));
        }

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if request.json_mode {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.provider_err(e.to_string(), e.is_timeout()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            let retriable = status.is_server_error() || status.as_u16() == 429;
            return Err(self.provider_err(format!("HTTP {status}: {error_body}"), retriable));
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| self.provider_err(e.to_string(), false))?;

        let content = resp["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        let usage = TokenUsage {
            input_tokens: resp["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: resp["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
        };

        Ok(ChatResponse { content, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_single_text_message_is_plain_string() {
        let v = encode_message(&Role::User, &[ContentPart::Text("hi".into())]);
        assert_eq!(v["role"], "user");
        assert_eq!(v["content"], "hi");
    }

    #[test]
    fn test_encode_image_message_is_part_array() {
        let parts = [
            ContentPart::ImageUrl("data:image/png;base64,AAAA".into()),
            ContentPart::Text("describe".into()),
        ];
        let v = encode_message(&Role::User, &parts);
        let content = v["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], "image_url");
        assert_eq!(
            content[0]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
        assert_eq!(content[1]["type"], "text");
        assert_eq!(content[1]["text"], "describe");
    }

    #[test]
    fn test_base_url_override() {
        let p = GroqProvider::new("key").with_base_url("http://localhost:9999/v1");
        assert_eq!(p.base_url, "http://localhost:9999/v1");
        assert_eq!(p.id(), "groq");
    }
}
