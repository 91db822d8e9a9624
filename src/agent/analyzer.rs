// src/agent/analyzer.rs — Vision analysis of the input image

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::{AnalysisReport, Analyzer};
use crate::infra::errors::RetouchError;
use crate::media;
use crate::provider::{ChatProvider, ChatRequest, Message};

/// Asks a vision model what is in the image and which adjustments would serve
/// the instruction. Advisory only; the workflow continues without it.
pub struct VisionAnalyzer {
    provider: Arc<dyn ChatProvider>,
    model: String,
}

impl VisionAnalyzer {
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

fn analysis_prompt(instruction: &str) -> String {
    format!(
        r#"Analyze this image for editing. The user wants to: "{instruction}"

Please provide:
1. IMAGE DESCRIPTION: Briefly describe what's in the image (subject, lighting, colors, composition)
2. AREAS OF FOCUS: List specific areas/elements that need to be modified to achieve the user's goal
3. SUGGESTED ADJUSTMENTS: List specific technical adjustments (brightness, contrast, color, etc.) with approximate values
4. TECHNICAL NOTES: Any important observations about the image quality, resolution, or challenges

Format your response as:
IMAGE_DESCRIPTION: <description>
AREAS_OF_FOCUS: <comma-separated list>
SUGGESTED_ADJUSTMENTS: <comma-separated list of adjustments>
TECHNICAL_NOTES: <notes>"#
    )
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse the line-oriented analysis format. Lenient: missing fields stay
/// empty, and an unparseable response falls back to the raw text as the
/// description.
fn parse_report(response: &str) -> AnalysisReport {
    let mut report = AnalysisReport::default();

    for line in response.lines() {
        let lower = line.to_lowercase();
        let value = || line.splitn(2, ':').nth(1).unwrap_or("").trim().to_string();
        if lower.starts_with("image_description:") {
            report.description = value();
        } else if lower.starts_with("areas_of_focus:") {
            report.focus_areas = split_list(&value());
        } else if lower.starts_with("suggested_adjustments:") {
            report.adjustments = split_list(&value());
        } else if lower.starts_with("technical_notes:") {
            report.technical_notes = value();
        }
    }

    if report.description.is_empty() {
        report.description = response.chars().take(200).collect();
    }

    report
}

#[async_trait]
impl Analyzer for VisionAnalyzer {
    async fn analyze(
        &self,
        image: &Path,
        instruction: &str,
    ) -> Result<AnalysisReport, RetouchError> {
        let data_url = media::encode_data_url(image)?;

        let response = self
            .provider
            .chat(ChatRequest {
                model: self.model.clone(),
                messages: vec![Message::user_with_image(
                    analysis_prompt(instruction),
                    data_url,
                )],
                temperature: Some(0.2),
                ..Default::default()
            })
            .await?;

        Ok(parse_report(&response.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_report() {
        let report = parse_report(
            "IMAGE_DESCRIPTION: A sunset over mountains\n\
             AREAS_OF_FOCUS: sky, horizon\n\
             SUGGESTED_ADJUSTMENTS: warm temperature +10, contrast +0.2\n\
             TECHNICAL_NOTES: slight noise in shadows",
        );
        assert_eq!(report.description, "A sunset over mountains");
        assert_eq!(report.focus_areas, vec!["sky", "horizon"]);
        assert_eq!(report.adjustments.len(), 2);
        assert_eq!(report.technical_notes, "slight noise in shadows");
    }

    #[test]
    fn test_parse_is_case_insensitive_on_labels() {
        let report = parse_report("Image_Description: portrait photo");
        assert_eq!(report.description, "portrait photo");
    }

    #[test]
    fn test_unparseable_response_falls_back_to_raw_text() {
        let report = parse_report("The image shows a cat on a sofa.");
        assert_eq!(report.description, "The image shows a cat on a sofa.");
        assert!(report.focus_areas.is_empty());
    }

    #[test]
    fn test_long_fallback_is_truncated() {
        let long = "x".repeat(500);
        let report = parse_report(&long);
        assert_eq!(report.description.len(), 200);
    }
}
