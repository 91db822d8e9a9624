// src/agent/verifier.rs — Vision check of the edited image

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::{Confidence, EditStep, Verdict, Verifier};
use crate::infra::errors::RetouchError;
use crate::media;
use crate::provider::{ChatProvider, ChatRequest, Message};

/// Shows the edited image to a vision model and asks whether the requested
/// edits are visible. Advisory QA: an internal failure here is reported as an
/// error and the workflow's soft-success policy takes over.
pub struct VisionVerifier {
    provider: Arc<dyn ChatProvider>,
    model: String,
}

impl VisionVerifier {
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

fn verification_prompt(instruction: &str, steps: &[EditStep]) -> String {
    let steps_text = steps
        .iter()
        .map(|s| s.operation.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Analyze this edited image. The user requested: "{instruction}"
The following edits were applied: {steps_text}

Determine if the edits are visible and match the request.

Respond in EXACTLY this format:
VERIFIED: yes or no
CONFIDENCE: high, medium, or low
FEEDBACK: Brief explanation of what you observe"#
    )
}

/// Parse the VERIFIED/CONFIDENCE/FEEDBACK line format. Lenient: anything
/// unrecognized leaves the default (not verified, low confidence, raw text
/// as feedback).
fn parse_verdict(response: &str) -> Verdict {
    let mut verified = false;
    let mut confidence = Confidence::Low;
    let mut feedback = response.trim().to_string();

    for line in response.lines() {
        let lower = line.to_lowercase();
        if lower.starts_with("verified:") {
            verified = lower.contains("yes");
        } else if lower.starts_with("confidence:") {
            if lower.contains("high") {
                confidence = Confidence::High;
            } else if lower.contains("medium") {
                confidence = Confidence::Medium;
            }
        } else if lower.starts_with("feedback:") {
            feedback = line.splitn(2, ':').nth(1).unwrap_or("").trim().to_string();
        }
    }

    Verdict {
        verified,
        confidence,
        feedback,
    }
}

#[async_trait]
impl Verifier for VisionVerifier {
    async fn verify(
        &self,
        _original: &Path,
        edited: &Path,
        instruction: &str,
        steps: &[EditStep],
    ) -> Result<Verdict, RetouchError> {
        let data_url = media::encode_data_url(edited)?;

        let response = self
            .provider
            .chat(ChatRequest {
                model: self.model.clone(),
                messages: vec![Message::user_with_image(
                    verification_prompt(instruction, steps),
                    data_url,
                )],
                temperature: Some(0.1),
                ..Default::default()
            })
            .await?;

        Ok(parse_verdict(&response.content))
    }
}
