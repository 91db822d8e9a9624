// src/agent/mod.rs — The five workflow collaborators and their result types
//
// The workflow core only sees these traits. Each agent returns a structured
// result or a typed error; any free-text parsing of model output happens
// inside the agent, never in the orchestrator.

pub mod analyzer;
pub mod executor;
pub mod generator;
pub mod planner;
pub mod verifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::infra::errors::RetouchError;

/// What the analyzer learned about the input image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub description: String,
    pub focus_areas: Vec<String>,
    pub adjustments: Vec<String>,
    pub technical_notes: String,
}

/// One concrete editing operation, e.g. `contrast_adjust` with
/// `{"direction": "increase", "amount": "moderate"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditStep {
    pub operation: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditPlan {
    pub understanding: String,
    pub edit_steps: Vec<EditStep>,
}

/// Outcome of running one generated command. Always returned, never thrown:
/// the executor normalizes every failure mode (bad command, nonzero exit,
/// timeout, missing artifact) into `succeeded == false` plus a message.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub succeeded: bool,
    pub output_path: Option<PathBuf>,
    pub stdout: String,
    pub stderr: String,
    pub error: Option<String>,
}

impl ExecutionReport {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// The verifier's judgement of the edited image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub verified: bool,
    pub confidence: Confidence,
    pub feedback: String,
}

#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        image: &Path,
        instruction: &str,
    ) -> Result<AnalysisReport, RetouchError>;
}

#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, instruction: &str) -> Result<EditPlan, RetouchError>;

    /// Re-plan after a failed verification, carrying the rejected steps and
    /// the verifier's feedback.
    async fn replan(
        &self,
        instruction: &str,
        prior_steps: &[EditStep],
        feedback: &str,
    ) -> Result<EditPlan, RetouchError>;
}

#[async_trait]
pub trait CommandGenerator: Send + Sync {
    async fn generate(
        &self,
        steps: &[EditStep],
        input: &Path,
        output: &Path,
    ) -> Result<String, RetouchError>;

    /// Regenerate after an execution failure, carrying the broken command and
    /// its error output so the model can repair it.
    async fn repair(
        &self,
        steps: &[EditStep],
        input: &Path,
        output: &Path,
        prior_command: &str,
        error: &str,
    ) -> Result<String, RetouchError>;
}

#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, command: &str) -> ExecutionReport;
}

#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(
        &self,
        original: &Path,
        edited: &Path,
        instruction: &str,
        steps: &[EditStep],
    ) -> Result<Verdict, RetouchError>;
}

/// The full set of collaborators, injected into the workflow at construction.
#[derive(Clone)]
pub struct StageAgents {
    pub analyzer: Arc<dyn Analyzer>,
    pub planner: Arc<dyn Planner>,
    pub generator: Arc<dyn CommandGenerator>,
    pub executor: Arc<dyn Executor>,
    pub verifier: Arc<dyn Verifier>,
}

/// Render edit steps as a bullet list for prompt text.
pub(crate) fn format_steps(steps: &[EditStep]) -> String {
    steps
        .iter()
        .map(|s| {
            format!(
                "- {}: {}",
                s.operation,
                serde_json::Value::Object(s.params.clone())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
