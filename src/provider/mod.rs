// src/provider/mod.rs — Chat-completion provider layer

pub mod groq;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infra::errors::RetouchError;

/// Trait implemented by chat-completion backends. The five workflow agents
/// hold one of these as `Arc<dyn ChatProvider>` and never touch HTTP directly.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn id(&self) -> &str;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, RetouchError>;
}

#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub system: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask the endpoint for a JSON object response (OpenAI `response_format`).
    pub json_mode: bool,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

/// One piece of a message body. Vision models take a data-URL image part
/// alongside the text prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContentPart {
    Text(String),
    ImageUrl(String),
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![ContentPart::Text(content.into())],
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            parts: vec![ContentPart::Text(content.into())],
        }
    }

    pub fn user_with_image(content: impl Into<String>, image_data_url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![
                ContentPart::ImageUrl(image_data_url.into()),
                ContentPart::Text(content.into()),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}
