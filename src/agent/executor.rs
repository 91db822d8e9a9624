// src/agent/executor.rs — Shell execution of generated ffmpeg commands

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

use super::{ExecutionReport, Executor};

/// Runs a generated command through the shell with a wall-clock timeout.
///
/// Never returns an error: every failure mode (rejected command, spawn
/// failure, nonzero exit, timeout, missing artifact) is normalized into an
/// `ExecutionReport` with `succeeded == false`, which the workflow treats as
/// a recoverable failure.
pub struct ShellExecutor {
    timeout: Duration,
}

impl ShellExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Is ffmpeg reachable on PATH? Used for startup diagnostics only.
    pub fn ffmpeg_available() -> bool {
        which::which("ffmpeg").is_ok()
    }
}

/// Pre-flight check: only ffmpeg invocations with an input flag get run.
fn looks_like_ffmpeg(command: &str) -> bool {
    let lower = command.trim().to_lowercase();
    lower.starts_with("ffmpeg") && command.contains("-i")
}

/// The output path is the last argument of an ffmpeg command.
fn extract_output_path(command: &str) -> Option<PathBuf> {
    let last = command.split_whitespace().last()?;
    let trimmed = last.trim_matches(|c| c == '"' || c == '\'');
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

#[async_trait]
impl Executor for ShellExecutor {
    async fn execute(&self, command: &str) -> ExecutionReport {
        if !looks_like_ffmpeg(command) {
            return ExecutionReport::failure("Invalid command: must be an ffmpeg command");
        }

        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Err(_) => {
                return ExecutionReport::failure(format!(
                    "Command timed out after {}s",
                    self.timeout.as_secs()
                ));
            }
            Ok(Err(e)) => return ExecutionReport::failure(e.to_string()),
            Ok(Ok(output)) => output,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or("signal".into(), |c| c.to_string());
            return ExecutionReport {
                stdout,
                stderr: stderr.clone(),
                error: Some(format!("ffmpeg error (code {code}): {stderr}")),
                ..Default::default()
            };
        }

        // A zero exit is not enough: insist the claimed artifact exists.
        match extract_output_path(command) {
            Some(path) if path.exists() => ExecutionReport {
                succeeded: true,
                output_path: Some(path),
                stdout,
                stderr,
                error: None,
            },
            _ => ExecutionReport {
                stdout,
                stderr,
                error: Some("Output file was not created".into()),
                ..Default::default()
            },
        }
    }
}
