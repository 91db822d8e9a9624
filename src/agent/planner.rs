// src/agent/planner.rs — Instruction decomposition into edit steps

use async_trait::async_trait;
use std::sync::Arc;

use super::{format_steps, EditPlan, EditStep, Planner};
use crate::infra::errors::RetouchError;
use crate::provider::{ChatProvider, ChatRequest, Message};

const SYSTEM_PROMPT: &str = r#"You are an expert image editing planner. Your job is to decompose user instructions into specific, technical image editing operations.

Given a user's request, output a JSON object with:
1. "understanding": A brief explanation of what the user wants
2. "edit_steps": A list of specific editing operations to achieve the goal

AVAILABLE EDIT OPERATIONS:
- brightness_adjust: Increase/decrease brightness (specify: "increase" or "decrease", amount: "slight", "moderate", "strong")
- contrast_adjust: Increase/decrease contrast
- saturation_adjust: Increase/decrease color saturation
- color_temperature: Warm or cool the image (specify: "warm" or "cool")
- color_grade: Apply color grading (specify style: "cinematic", "vintage", "vibrant", etc.)
- vignette: Add dark edges vignette effect
- blur: Apply blur (specify: "gaussian", "motion", amount)
- sharpen: Sharpen the image
- grayscale: Convert to black and white
- sepia: Apply sepia tone
- crop: Crop the image (specify region or aspect ratio)
- resize: Resize image (specify dimensions or scale)
- rotate: Rotate image (specify degrees)
- flip: Flip image (specify: "horizontal" or "vertical")
- noise_reduction: Reduce noise/grain
- exposure_adjust: Adjust exposure

EXAMPLE INPUT: "make it look cinematic"
EXAMPLE OUTPUT:
{
  "understanding": "User wants a cinematic film look with enhanced contrast, warm tones, and vignette",
  "edit_steps": [
    {"operation": "contrast_adjust", "params": {"direction": "increase", "amount": "moderate"}},
    {"operation": "color_temperature", "params": {"direction": "warm", "amount": "slight"}},
    {"operation": "saturation_adjust", "params": {"direction": "decrease", "amount": "slight"}},
    {"operation": "vignette", "params": {"intensity": "moderate"}}
  ]
}

Always respond with valid JSON only."#;

/// Turns one natural-language instruction into an ordered list of edit
/// operations. A failure here is fatal to the run: without a plan there is
/// nothing to generate.
pub struct LlmPlanner {
    provider: Arc<dyn ChatProvider>,
    model: String,
}

impl LlmPlanner {
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    async fn request_plan(&self, messages: Vec<Message>) -> Result<EditPlan, RetouchError> {
        let response = self
            .provider
            .chat(ChatRequest {
                model: self.model.clone(),
                messages,
                system: Some(SYSTEM_PROMPT.into()),
                temperature: Some(0.2),
                json_mode: true,
                ..Default::default()
            })
            .await?;

        parse_plan(&response.content)
    }
}

/// Strip a leading/trailing markdown code fence, if present.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line, then the closing fence.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or(rest);
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn parse_plan(content: &str) -> Result<EditPlan, RetouchError> {
    let plan: EditPlan = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| RetouchError::MalformedResponse(format!("plan is not valid JSON: {e}")))?;

    if plan.edit_steps.is_empty() {
        return Err(RetouchError::MalformedResponse(
            "plan contains no edit steps".into(),
        ));
    }

    Ok(plan)
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(&self, instruction: &str) -> Result<EditPlan, RetouchError> {
        self.request_plan(vec![Message::user(format!(
            "Plan the edits for this instruction: {instruction}"
        ))])
        .await
    }

    async fn replan(
        &self,
        instruction: &str,
        prior_steps: &[EditStep],
        feedback: &str,
    ) -> Result<EditPlan, RetouchError> {
        self.request_plan(vec![
            Message::user(format!(
                "Plan the edits for this instruction: {instruction}"
            )),
            Message::assistant(format_steps(prior_steps)),
            Message::user(format!(
                "The previous plan didn't achieve the desired result. Feedback: {feedback}\n\
                 Please create an improved plan."
            )),
        ])
        .await
    }
}
