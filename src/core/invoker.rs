// src/core/invoker.rs — Uniform stage invocation
//
// Calls one collaborator per method, normalizes its outcome into a new state
// snapshot, and never lets a stage error escape. Which failures are soft,
// recoverable, or fatal is decided here, per stage:
//   Analyze  — soft (log and continue with the prior snapshot)
//   Plan     — fatal (no plan, nothing to build)
//   Generate — fatal (no command, nothing to run)
//   Execute  — recoverable (consumes one shared attempt)
//   Verify   — recoverable when unverified; internal errors count as verified

use std::path::PathBuf;

use super::state::WorkflowState;
use crate::agent::StageAgents;
use crate::media;

pub struct StageInvoker {
    agents: StageAgents,
    output_dir: PathBuf,
}

impl StageInvoker {
    pub fn new(agents: StageAgents, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            agents,
            output_dir: output_dir.into(),
        }
    }

    /// Analyze the input image. Best-effort enrichment: on failure the state
    /// is returned unchanged and the run continues.
    pub async fn analyze(&self, state: WorkflowState) -> WorkflowState {
        tracing::info!(image = %state.image_path.display(), "analyzing input image");

        match self
            .agents
            .analyzer
            .analyze(&state.image_path, &state.instruction)
            .await
        {
            Ok(report) => {
                tracing::info!(
                    focus_areas = report.focus_areas.len(),
                    adjustments = report.adjustments.len(),
                    "analysis complete"
                );
                let mut next = state;
                next.description = Some(report.description);
                next.focus_areas = report.focus_areas;
                next.adjustments = report.adjustments;
                next.technical_notes = Some(report.technical_notes);
                next
            }
            Err(e) => {
                tracing::warn!("analysis failed, continuing without it: {e}");
                state
            }
        }
    }

    /// Plan (or re-plan) the edit steps. Failure is fatal to the run.
    pub async fn plan(&self, state: WorkflowState) -> WorkflowState {
        tracing::info!(instruction = %state.instruction, "planning edits");

        let result = match (&state.verification_feedback, state.edit_steps.is_empty()) {
            (Some(feedback), false) => {
                self.agents
                    .planner
                    .replan(&state.instruction, &state.edit_steps, feedback)
                    .await
            }
            _ => self.agents.planner.plan(&state.instruction).await,
        };

        match result {
            Ok(plan) => {
                tracing::info!(steps = plan.edit_steps.len(), "plan ready");
                let mut next = state;
                next.understanding = Some(plan.understanding);
                next.edit_steps = plan.edit_steps;
                next
            }
            Err(e) => {
                tracing::error!("planning failed: {e}");
                state.with_fatal_error(format!("planning failed: {e}"))
            }
        }
    }

    /// Generate (or repair) the command, targeting a fresh collision-free
    /// output path. Failure is fatal to the run.
    pub async fn generate(&self, state: WorkflowState) -> WorkflowState {
        let output_path = media::fresh_output_path(&self.output_dir, &state.image_path);

        let result = match (&state.execution_error, &state.command) {
            (Some(error), Some(prior)) => {
                tracing::info!("regenerating command after execution failure");
                self.agents
                    .generator
                    .repair(
                        &state.edit_steps,
                        &state.image_path,
                        &output_path,
                        prior,
                        error,
                    )
                    .await
            }
            _ => {
                tracing::info!("generating command");
                self.agents
                    .generator
                    .generate(&state.edit_steps, &state.image_path, &output_path)
                    .await
            }
        };

        match result {
            Ok(command) => {
                tracing::debug!(command = %command, "command ready");
                let mut next = state;
                next.command = Some(command);
                next.output_path = Some(output_path);
                next.execution_error = None;
                next
            }
            Err(e) => {
                tracing::error!("command generation failed: {e}");
                state.with_fatal_error(format!("command generation failed: {e}"))
            }
        }
    }

    /// Execute the command. A failure consumes one shared attempt and leaves
    /// the error in the state for the repair path.
    pub async fn execute(&self, state: WorkflowState) -> WorkflowState {
        let Some(ref command) = state.command else {
            // Unreachable through the workflow; generate always runs first.
            return state.with_fatal_error("execute invoked without a command");
        };

        tracing::info!("running command");
        let report = self.agents.executor.execute(command).await;

        let mut next = state;
        if report.succeeded {
            if let Some(path) = report.output_path {
                tracing::info!(output = %path.display(), "execution succeeded");
                next.output_path = Some(path);
            } else {
                tracing::info!("execution succeeded");
            }
            next.execution_succeeded = Some(true);
            next.execution_error = None;
        } else {
            let error = report
                .error
                .unwrap_or_else(|| "execution failed with no error message".into());
            tracing::warn!(attempt = next.attempt + 1, "execution failed: {error}");
            next.execution_succeeded = Some(false);
            next.execution_error = Some(error);
            next.attempt += 1;
        }
        next
    }

    /// Verify the artifact. A negative verdict consumes one shared attempt; a
    /// verifier-internal error is treated as verified (soft-success policy:
    /// verification is advisory QA, not a gate).
    pub async fn verify(&self, state: WorkflowState) -> WorkflowState {
        let Some(output_path) = state.output_path.clone() else {
            // Unreachable through the workflow; verify only follows a
            // successful execution. Fall through to the soft-success policy.
            tracing::warn!("verify invoked without an output path, assuming success");
            let mut next = state;
            next.verified = Some(true);
            next.completed = true;
            return next;
        };

        tracing::info!("verifying edited image");
        let result = self
            .agents
            .verifier
            .verify(
                &state.image_path,
                &output_path,
                &state.instruction,
                &state.edit_steps,
            )
            .await;

        let mut next = state;
        match result {
            Ok(verdict) => {
                tracing::info!(
                    verified = verdict.verified,
                    confidence = %verdict.confidence,
                    "verdict received"
                );
                if verdict.verified {
                    next.verified = Some(true);
                    next.verification_feedback = Some(verdict.feedback);
                    next.completed = true;
                } else {
                    next.verified = Some(false);
                    next.verification_feedback = Some(verdict.feedback);
                    next.attempt += 1;
                }
            }
            Err(e) => {
                tracing::warn!("verifier unavailable, treating run as verified: {e}");
                next.verified = Some(true);
                next.completed = true;
            }
        }
        next
    }
}
