// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub ffmpeg: FfmpegConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Text model used by the planner and command generator.
    pub text: String,
    /// Vision model used by the analyzer and verifier.
    pub vision: String,
    /// API key. Usually left unset here; the GROQ_API_KEY env var wins.
    pub api_key: Option<String>,
    /// OpenAI-compatible endpoint base URL.
    pub base_url: Option<String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            text: "openai/gpt-oss-120b".into(),
            vision: "meta-llama/llama-4-maverick-17b-128e-instruct".into(),
            api_key: None,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FfmpegConfig {
    /// Wall-clock limit for one command execution.
    pub timeout_seconds: u64,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Shared retry budget across the execution and verification loops.
    pub max_retries: u32,
    /// Directory where edited images are written.
    pub output_dir: Option<PathBuf>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            output_dir: None,
        }
    }
}

impl Config {
    /// Load from ~/.retouch/config.toml, falling back to defaults when absent.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_dir().join("config.toml");
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Resolve the API key: environment variable first, then config file.
    pub fn api_key(&self) -> Option<String> {
        std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.models.api_key.clone())
    }

    /// Resolve the output directory, defaulting to ./output.
    pub fn output_dir(&self) -> PathBuf {
        self.workflow
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("output"))
    }
}

/// Configuration directory: $RETOUCH_HOME or ~/.retouch
pub fn config_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("RETOUCH_HOME") {
        return PathBuf::from(home);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".retouch")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.models.text, "openai/gpt-oss-120b");
        assert_eq!(cfg.ffmpeg.timeout_seconds, 60);
        assert_eq!(cfg.workflow.max_retries, 3);
        assert_eq!(cfg.output_dir(), PathBuf::from("output"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [workflow]
            max_retries = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.workflow.max_retries, 5);
        assert_eq!(cfg.ffmpeg.timeout_seconds, 60);
        assert!(!cfg.models.vision.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [models]
            text = "some/text-model"
            vision = "some/vision-model"

            [ffmpeg]
            timeout_seconds = 120
            "#,
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.models.text, "some/text-model");
        assert_eq!(cfg.ffmpeg.timeout_seconds, 120);
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
