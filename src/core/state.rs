// src/core/state.rs — The state record threaded through all workflow stages

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::agent::EditStep;

/// Everything one run knows: inputs, intermediate artifacts, and control
/// counters. Owned exclusively by the workflow; stages take a snapshot and
/// return a new one (functional update), so prior snapshots stay inspectable
/// and independent runs share nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    // Immutable inputs
    pub image_path: PathBuf,
    pub instruction: String,
    pub max_attempts: u32,

    // Analysis (best-effort, may stay empty)
    pub description: Option<String>,
    pub focus_areas: Vec<String>,
    pub adjustments: Vec<String>,
    pub technical_notes: Option<String>,

    // Plan
    pub understanding: Option<String>,
    pub edit_steps: Vec<EditStep>,

    // Generate / Execute
    pub command: Option<String>,
    pub output_path: Option<PathBuf>,
    pub execution_succeeded: Option<bool>,
    pub execution_error: Option<String>,

    // Verify
    pub verified: Option<bool>,
    pub verification_feedback: Option<String>,

    // Control
    pub attempt: u32,
    pub completed: bool,
    pub fatal_error: Option<String>,
}

impl WorkflowState {
    pub fn new(
        image_path: impl Into<PathBuf>,
        instruction: impl Into<String>,
        max_attempts: u32,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            instruction: instruction.into(),
            max_attempts,
            description: None,
            focus_areas: Vec::new(),
            adjustments: Vec::new(),
            technical_notes: None,
            understanding: None,
            edit_steps: Vec::new(),
            command: None,
            output_path: None,
            execution_succeeded: None,
            execution_error: None,
            verified: None,
            verification_feedback: None,
            attempt: 0,
            completed: false,
            fatal_error: None,
        }
    }

    /// Mark the run fatally failed. No further stages run after this.
    pub fn with_fatal_error(mut self, message: impl Into<String>) -> Self {
        self.fatal_error = Some(message.into());
        self.completed = true;
        self
    }

    /// Classify the final snapshot into the three terminal outcomes callers
    /// must distinguish.
    pub fn outcome(&self) -> RunOutcome {
        if self.fatal_error.is_some() {
            return RunOutcome::Failed;
        }
        match (self.execution_succeeded, self.verified) {
            (Some(true), Some(true)) => RunOutcome::Success,
            // An artifact exists but verification never passed: budget ran
            // out, or the verdict stayed negative.
            (Some(true), _) => RunOutcome::Degraded,
            // Execution never succeeded; nothing usable was produced.
            _ => RunOutcome::Failed,
        }
    }
}

/// Terminal outcome of a run. Deliberately three-way, not a boolean: callers
/// need to tell "no usable artifact" apart from "unverified artifact exists".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Executed and verified.
    Success,
    /// An artifact was produced but verification did not pass.
    Degraded,
    /// Fatal error, or no successful execution at all.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let s = WorkflowState::new("in.png", "make it pop", 3);
        assert_eq!(s.attempt, 0);
        assert!(!s.completed);
        assert!(s.edit_steps.is_empty());
        assert!(s.execution_succeeded.is_none());
        assert!(s.verified.is_none());
        assert!(s.fatal_error.is_none());
    }

    #[test]
    fn test_with_fatal_error_completes_run() {
        let s = WorkflowState::new("in.png", "x", 3).with_fatal_error("planner exploded");
        assert!(s.completed);
        assert_eq!(s.fatal_error.as_deref(), Some("planner exploded"));
        assert_eq!(s.outcome(), RunOutcome::Failed);
    }

    #[test]
    fn test_outcome_success_requires_execution_and_verification() {
        let mut s = WorkflowState::new("in.png", "x", 3);
        s.execution_succeeded = Some(true);
        s.verified = Some(true);
        assert_eq!(s.outcome(), RunOutcome::Success);
    }

    #[test]
    fn test_outcome_degraded_when_unverified_artifact() {
        let mut s = WorkflowState::new("in.png", "x", 3);
        s.execution_succeeded = Some(true);
        s.verified = Some(false);
        assert_eq!(s.outcome(), RunOutcome::Degraded);

        s.verified = None;
        assert_eq!(s.outcome(), RunOutcome::Degraded);
    }

    #[test]
    fn test_outcome_failed_without_successful_execution() {
        let mut s = WorkflowState::new("in.png", "x", 3);
        assert_eq!(s.outcome(), RunOutcome::Failed);

        s.execution_succeeded = Some(false);
        assert_eq!(s.outcome(), RunOutcome::Failed);
    }

    #[test]
    fn test_fatal_error_dominates_outcome() {
        let mut s = WorkflowState::new("in.png", "x", 3);
        s.execution_succeeded = Some(true);
        s.verified = Some(true);
        let s = s.with_fatal_error("late failure");
        assert_eq!(s.outcome(), RunOutcome::Failed);
    }

    #[test]
    fn test_snapshots_are_independent() {
        let before = WorkflowState::new("in.png", "x", 3);
        let mut after = before.clone();
        after.attempt = 2;
        after.completed = true;
        assert_eq!(before.attempt, 0);
        assert!(!before.completed);
    }
}
