// src/core/workflow.rs — The workflow state machine
//
// Stage order: Analyze → Plan → Generate → Execute → Verify, with two retry
// loops sharing one attempt budget:
//
//           ┌────────────── re-plan (verification failed) ──────────────┐
//           ▼                                                           │
//   Analyze → Plan → Generate → Execute ──ok──► Verify ──verified──► done
//                        ▲          │
//                        └── repair ┘  (execution failed)
//
// Both decision points are pure functions over a state snapshot; everything
// that can block lives inside a stage call.

use super::budget::RetryBudget;
use super::invoker::StageInvoker;
use super::state::WorkflowState;
use crate::agent::StageAgents;

/// Where to go after an Execute invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteDecision {
    /// Execution succeeded; move on to verification.
    Verify,
    /// Execution failed and budget remains; repair the command.
    Regenerate,
    /// Execution failed and the budget is spent; stop.
    Stop,
}

/// Where to go after a Verify invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyDecision {
    /// Verified (or already completed); stop.
    Stop,
    /// Not verified and budget remains; re-plan with the feedback.
    Replan,
}

/// Decide the transition after Execute. Pure: same snapshot, same answer.
pub fn decide_after_execute(state: &WorkflowState) -> ExecuteDecision {
    if state.execution_succeeded == Some(true) {
        ExecuteDecision::Verify
    } else if !RetryBudget::new(state.max_attempts).can_retry(state.attempt) {
        ExecuteDecision::Stop
    } else {
        ExecuteDecision::Regenerate
    }
}

/// Decide the transition after Verify. Pure: same snapshot, same answer.
pub fn decide_after_verify(state: &WorkflowState) -> VerifyDecision {
    if state.verified == Some(true) || state.completed {
        VerifyDecision::Stop
    } else if !RetryBudget::new(state.max_attempts).can_retry(state.attempt) {
        VerifyDecision::Stop
    } else {
        VerifyDecision::Replan
    }
}

/// The workflow driver. Owns the stage invoker (and through it the five
/// injected collaborators); one `run` call takes an initial state to a
/// terminal snapshot.
pub struct Workflow {
    invoker: StageInvoker,
}

impl Workflow {
    pub fn new(agents: StageAgents, output_dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            invoker: StageInvoker::new(agents, output_dir),
        }
    }

    /// Run to a terminal state. Guarantees termination: every loop-back edge
    /// requires `attempt < max_attempts`, and `attempt` strictly increases on
    /// each recoverable failure, so stage invocations are bounded by a linear
    /// function of `max_attempts`.
    ///
    /// The returned snapshot always has `completed == true`; callers classify
    /// it with [`WorkflowState::outcome`].
    pub async fn run(&self, initial: WorkflowState) -> WorkflowState {
        let mut state = self.invoker.analyze(initial).await;

        loop {
            // Plan → Generate, each fatal on failure.
            state = self.invoker.plan(state).await;
            if state.fatal_error.is_some() {
                return state;
            }
            state = self.invoker.generate(state).await;
            if state.fatal_error.is_some() {
                return state;
            }

            // Execute ↔ Generate repair lap.
            loop {
                state = self.invoker.execute(state).await;
                match decide_after_execute(&state) {
                    ExecuteDecision::Verify => break,
                    ExecuteDecision::Stop => return Self::finish(state),
                    ExecuteDecision::Regenerate => {
                        state = self.invoker.generate(state).await;
                        if state.fatal_error.is_some() {
                            return state;
                        }
                    }
                }
            }

            state = self.invoker.verify(state).await;
            match decide_after_verify(&state) {
                VerifyDecision::Stop => return Self::finish(state),
                VerifyDecision::Replan => continue,
            }
        }
    }

    /// Terminal bookkeeping: budget-exhaustion stops also count as completed,
    /// so a returned snapshot is never "still in progress".
    fn finish(mut state: WorkflowState) -> WorkflowState {
        state.completed = true;
        state
    }
}
