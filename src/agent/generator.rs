// src/agent/generator.rs — ffmpeg command generation from an edit plan

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::planner::strip_code_fence;
use super::{format_steps, CommandGenerator, EditStep};
use crate::infra::errors::RetouchError;
use crate::provider::{ChatProvider, ChatRequest, Message};

const SYSTEM_PROMPT: &str = r#"You are an FFmpeg expert. Generate the exact FFmpeg command to apply the specified image edits.

RULES:
1. Output ONLY the FFmpeg command, no explanations
2. Use INPUT_PATH and OUTPUT_PATH as placeholders
3. Always use -y flag to overwrite without asking
4. Chain multiple filters using comma separation in a single -vf
5. Use appropriate filter values for the specified intensities

FILTER REFERENCE:
- Brightness: eq=brightness=X (range: -1.0 to 1.0, slight=±0.1, moderate=±0.2, strong=±0.3)
- Contrast: eq=contrast=X (range: 0.0 to 2.0, default=1.0, slight=1.1/0.9, moderate=1.3/0.7, strong=1.5/0.5)
- Saturation: eq=saturation=X (range: 0.0 to 3.0, default=1.0, slight=1.2/0.8, moderate=1.5/0.5)
- Warm tones: colorbalance=rs=0.1:gs=0.05:bs=-0.1 (adjust values for intensity)
- Cool tones: colorbalance=rs=-0.1:gs=0:bs=0.1
- Vignette: vignette=PI/4 (adjust angle for intensity)
- Gaussian blur: gblur=sigma=X (slight=2, moderate=5, strong=10)
- Sharpen: unsharp=5:5:X:5:5:0 (X: slight=0.5, moderate=1.0, strong=1.5)
- Grayscale: format=gray
- Sepia: colorchannelmixer=.393:.769:.189:0:.349:.686:.168:0:.272:.534:.131
- Crop: crop=w:h:x:y
- Scale: scale=W:H (use -1 to maintain aspect ratio)
- Rotate: rotate=X*PI/180
- Flip: hflip or vflip

EXAMPLE:
Edit steps: increase contrast moderate, warm color temperature slight, add vignette
Command: ffmpeg -y -i INPUT_PATH -vf "eq=contrast=1.3,colorbalance=rs=0.08:gs=0.04:bs=-0.08,vignette=PI/4" OUTPUT_PATH"#;

/// Generates a runnable ffmpeg command from edit steps. Like planning, a
/// failure here is fatal: there is no artifact without a command.
pub struct LlmCommandGenerator {
    provider: Arc<dyn ChatProvider>,
    model: String,
}

impl LlmCommandGenerator {
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    async fn request_command(
        &self,
        messages: Vec<Message>,
        input: &Path,
        output: &Path,
    ) -> Result<String, RetouchError> {
        let response = self
            .provider
            .chat(ChatRequest {
                model: self.model.clone(),
                messages,
                system: Some(SYSTEM_PROMPT.into()),
                temperature: Some(0.1),
                ..Default::default()
            })
            .await?;

        let command = substitute_paths(strip_code_fence(&response.content), input, output);
        if command.is_empty() {
            return Err(RetouchError::MalformedResponse(
                "generator returned an empty command".into(),
            ));
        }
        Ok(command)
    }
}

/// Replace the INPUT_PATH/OUTPUT_PATH placeholders with quoted real paths.
fn substitute_paths(command: &str, input: &Path, output: &Path) -> String {
    command
        .replace("INPUT_PATH", &format!("\"{}\"", input.display()))
        .replace("OUTPUT_PATH", &format!("\"{}\"", output.display()))
        .trim()
        .to_string()
}

#[async_trait]
impl CommandGenerator for LlmCommandGenerator {
    async fn generate(
        &self,
        steps: &[EditStep],
        input: &Path,
        output: &Path,
    ) -> Result<String, RetouchError> {
        self.request_command(
            vec![Message::user(format!(
                "Generate FFmpeg command for these edit steps:\n{}",
                format_steps(steps)
            ))],
            input,
            output,
        )
        .await
    }

    async fn repair(
        &self,
        steps: &[EditStep],
        input: &Path,
        output: &Path,
        prior_command: &str,
        error: &str,
    ) -> Result<String, RetouchError> {
        self.request_command(
            vec![
                Message::user(format!(
                    "Generate FFmpeg command for these edit steps:\n{}",
                    format_steps(steps)
                )),
                Message::assistant(prior_command),
                Message::user(format!(
                    "That command failed with error: {error}\nPlease fix it."
                )),
            ],
            input,
            output,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_substitute_paths() {
        let cmd = substitute_paths(
            "ffmpeg -y -i INPUT_PATH -vf \"format=gray\" OUTPUT_PATH",
            Path::new("/in/photo.png"),
            Path::new("/out/edited.png"),
        );
        assert_eq!(
            cmd,
            "ffmpeg -y -i \"/in/photo.png\" -vf \"format=gray\" \"/out/edited.png\""
        );
    }

    #[test]
    fn test_substitute_paths_trims_whitespace() {
        let cmd = substitute_paths(
            "  ffmpeg -y -i INPUT_PATH OUTPUT_PATH \n",
            Path::new("a.png"),
            Path::new("b.png"),
        );
        assert!(cmd.starts_with("ffmpeg"));
        assert!(cmd.ends_with("\"b.png\""));
    }
}
