// src/core/mod.rs — Workflow core: state, budget, stage invocation, orchestration

pub mod budget;
pub mod invoker;
pub mod state;
pub mod workflow;
