//! Wayfarer - agentic browser journey explorer.
//!
//! Main entry point for the Wayfarer CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use wayfarer_bridge::bridge::BridgeConfig;
use wayfarer_oracle_openai::OpenAIOracle;
use wayfarer_protocols::run::{FinalResult, RunRequest};
use wayfarer_runtime::{run_agent, PolicyPreset, RunOptions};

mod cli;
mod config;

use cli::{Cli, Commands};
use config::{Config, ConfigLoader};

/// Get the .wayfarer directory path.
fn wayfarer_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".wayfarer"))
        .unwrap_or_else(|| PathBuf::from(".wayfarer"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.wayfarer/debug/ with daily rotation.
fn init_tracing() -> anyhow::Result<()> {
    let log_dir = wayfarer_dir().join("debug");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("wayfarer")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the worker guard alive for the program duration.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer goes to stderr so stdout stays machine-readable.
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(ConfigLoader::default_path);
    let config = ConfigLoader::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    match cli.command {
        Commands::Run {
            url,
            cdp_endpoint,
            policy,
            max_steps,
            timeout_seconds,
            model,
            api_key,
            log_dir,
        } => {
            let result = cmd_run(
                &config,
                &url,
                &cdp_endpoint,
                policy,
                max_steps,
                timeout_seconds,
                model,
                api_key,
                log_dir,
            )
            .await?;

            println!("{}", serde_json::to_string_pretty(&result)?);

            if !result.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Execute one journey run and return its structured result.
#[allow(clippy::too_many_arguments)]
async fn cmd_run(
    config: &Config,
    url: &str,
    cdp_endpoint: &str,
    preset: PolicyPreset,
    max_steps: Option<u32>,
    timeout_seconds: Option<u64>,
    model: Option<String>,
    api_key: Option<String>,
    log_dir: Option<PathBuf>,
) -> anyhow::Result<FinalResult> {
    url::Url::parse(url).with_context(|| format!("Invalid target URL: {url}"))?;

    let api_key = api_key
        .or_else(|| config.oracle.api_key.clone())
        .context("No API key: pass --api-key, set OPENAI_API_KEY, or configure [oracle].api_key")?;

    let mut oracle = OpenAIOracle::new(api_key);
    if let Some(api_url) = &config.oracle.api_url {
        oracle = oracle.with_url(api_url.clone());
    }
    if let Some(model) = model.or_else(|| config.oracle.model.clone()) {
        oracle = oracle.with_model(model);
    }
    if let Some(temperature) = config.oracle.temperature {
        oracle = oracle.with_temperature(temperature);
    }
    if let Some(max_tokens) = config.oracle.max_tokens {
        oracle = oracle.with_max_tokens(max_tokens);
    }
    info!("Using oracle model {}", oracle.model());

    let mut policy = preset.policy();
    if let Some(n) = max_steps.or(config.run.max_steps) {
        policy = policy.with_max_steps(n);
    }
    if let Some(s) = timeout_seconds.or(config.run.timeout_seconds) {
        policy = policy.with_timeout_seconds(s);
    }
    if let Some(ms) = config.run.settle_delay_ms {
        policy = policy.with_settle_delay_ms(ms);
    }

    let artifact_dir = log_dir
        .or_else(|| {
            config
                .diagnostics
                .log_dir
                .as_deref()
                .map(|d| PathBuf::from(ConfigLoader::expand_path(d)))
        })
        .unwrap_or_else(|| wayfarer_dir().join("runs"));

    let bridge = config.bridge.command.as_ref().map(|command| BridgeConfig {
        command: command.clone(),
        args: config.bridge.args.clone(),
    });

    let request = RunRequest {
        id: Uuid::new_v4().to_string(),
        url: url.to_string(),
        cdp_endpoint: cdp_endpoint.to_string(),
    };
    let options = RunOptions {
        artifact_dir: Some(artifact_dir),
        bridge,
        ..Default::default()
    };

    Ok(run_agent(&request, Arc::new(oracle), policy, options).await)
}
