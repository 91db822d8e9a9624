// src/cli/mod.rs — CLI definition (clap derive)

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "retouch",
    about = "AI-powered image editor: natural language in, verified ffmpeg edit out",
    version
)]
pub struct Cli {
    /// Path to the input image
    #[arg(short, long)]
    pub image: PathBuf,

    /// Natural-language editing instruction
    #[arg(short = 't', long)]
    pub instruction: String,

    /// Maximum retry attempts, shared across execution and verification
    /// failures (overrides config)
    #[arg(short = 'r', long)]
    pub max_retries: Option<u32>,

    /// Config file path (default: ~/.retouch/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Suppress the banner and result report (exit code only)
    #[arg(long)]
    pub quiet: bool,
}
