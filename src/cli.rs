//! CLI definitions for Wayfarer.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use wayfarer_runtime::PolicyPreset;

/// Wayfarer CLI.
#[derive(Parser)]
#[command(name = "wayfarer")]
#[command(about = "Agentic browser journey explorer")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.wayfarer/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Explore one journey against a live browser session
    Run {
        /// Target URL for the journey
        #[arg(long)]
        url: String,

        /// CDP endpoint of the remote browser session
        #[arg(long)]
        cdp_endpoint: String,

        /// Instruction preset (journey, form)
        #[arg(long, default_value = "journey")]
        policy: PolicyPreset,

        /// Step budget override
        #[arg(long)]
        max_steps: Option<u32>,

        /// Wall-clock budget override, in seconds
        #[arg(long)]
        timeout_seconds: Option<u64>,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// API key for the decision oracle
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Directory for per-run diagnostic artifacts
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },
}
