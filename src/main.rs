// src/main.rs — retouch entry point

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use retouch::agent::executor::ShellExecutor;
use retouch::agent::{
    analyzer::VisionAnalyzer, generator::LlmCommandGenerator, planner::LlmPlanner,
    verifier::VisionVerifier, StageAgents,
};
use retouch::cli::Cli;
use retouch::core::state::{RunOutcome, WorkflowState};
use retouch::core::workflow::Workflow;
use retouch::infra::config::Config;
use retouch::infra::errors::RetouchError;
use retouch::infra::logger;
use retouch::media;
use retouch::provider::groq::GroqProvider;
use retouch::provider::ChatProvider;

#[tokio::main]
async fn main() {
    // Respects RUST_LOG
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        Config::load_from(path)?
    } else {
        Config::load()?
    };

    let image_path = std::fs::canonicalize(&cli.image).unwrap_or_else(|_| cli.image.clone());
    media::validate_image(&image_path)?;

    if cli.instruction.trim().is_empty() {
        anyhow::bail!("instruction must not be empty");
    }

    let api_key = config.api_key().ok_or(RetouchError::NoApiKey)?;
    let max_attempts = cli.max_retries.unwrap_or(config.workflow.max_retries);

    let output_dir = config.output_dir();
    std::fs::create_dir_all(&output_dir)?;

    if !cli.quiet {
        println!("{}", "=".repeat(60));
        println!("RETOUCH");
        println!("{}", "=".repeat(60));
        println!("Input: {}", image_path.display());
        println!("Instruction: {}", cli.instruction);
        println!("Max retries: {max_attempts}");
        if !ShellExecutor::ffmpeg_available() {
            println!("Warning: ffmpeg not found on PATH; execution will fail");
        }
        println!("{}", "=".repeat(60));
    }

    let provider: Arc<dyn ChatProvider> = {
        let mut p = GroqProvider::new(api_key);
        if let Some(ref base_url) = config.models.base_url {
            p = p.with_base_url(base_url);
        }
        Arc::new(p)
    };

    let agents = StageAgents {
        analyzer: Arc::new(VisionAnalyzer::new(provider.clone(), &config.models.vision)),
        planner: Arc::new(LlmPlanner::new(provider.clone(), &config.models.text)),
        generator: Arc::new(LlmCommandGenerator::new(
            provider.clone(),
            &config.models.text,
        )),
        executor: Arc::new(ShellExecutor::new(Duration::from_secs(
            config.ffmpeg.timeout_seconds,
        ))),
        verifier: Arc::new(VisionVerifier::new(provider, &config.models.vision)),
    };

    let workflow = Workflow::new(agents, &output_dir);
    let initial = WorkflowState::new(image_path, cli.instruction, max_attempts);
    let result = workflow.run(initial).await;

    report(&result, cli.quiet)
}

/// Print the terminal report and map the three-way outcome to the exit code.
fn report(result: &WorkflowState, quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("\n{}", "=".repeat(60));
        println!("RESULT");
        println!("{}", "=".repeat(60));
    }

    if let Some(ref fatal) = result.fatal_error {
        anyhow::bail!("{fatal}");
    }

    // Trust the artifact only if it actually exists on disk.
    let artifact = result
        .output_path
        .as_ref()
        .filter(|p| p.exists() && result.execution_succeeded == Some(true));

    match (result.outcome(), artifact) {
        (RunOutcome::Failed, _) | (_, None) => {
            if !quiet {
                println!("Failed to generate output");
                if let Some(ref e) = result.execution_error {
                    println!("Execution error: {e}");
                }
                if let Some(ref f) = result.verification_feedback {
                    println!("Verification feedback: {f}");
                }
            }
            anyhow::bail!("no usable output produced");
        }
        (outcome, Some(path)) => {
            if !quiet {
                println!("Output saved to: {}", path.display());
                println!("Attempts: {}", result.attempt + 1);
                match outcome {
                    RunOutcome::Success => {
                        if let Some(ref f) = result.verification_feedback {
                            println!("Verification: {f}");
                        }
                    }
                    RunOutcome::Degraded => {
                        println!("Note: output is unverified (best effort)");
                        if let Some(ref f) = result.verification_feedback {
                            println!("Last feedback: {f}");
                        }
                    }
                    RunOutcome::Failed => unreachable!("handled above"),
                }
            }
            Ok(())
        }
    }
}
