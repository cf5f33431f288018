//! qrlink-gen - QR link generator
//!
//! Prompts for a URL and a recipient mobile number, writes the URL as a QR
//! code PNG, asks a generative-text API for a short summary of the URL, and
//! stores the result in the `qrcode_generator` table.
//!
//! Every stage degrades independently; the process always exits normally.

use anyhow::Result;
use clap::Parser;
use qrlink_common::config::{config_or_default, load_toml_config, resolve_config_path};
use qrlink_gen::input::PromptInput;
use qrlink_gen::{Pipeline, PipelineSettings};
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for qrlink-gen (all optional)
#[derive(Parser, Debug)]
#[command(name = "qrlink-gen")]
#[command(about = "Generate a QR code for a link, summarize it, and record it")]
#[command(version)]
struct Args {
    /// Config file with db.url, db.username, db.password and optional api/output sections
    #[arg(short, long, env = "QRLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level directive (overrides RUST_LOG and logging.level)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Parsed before the subscriber exists; the outcome is logged below
    let config_path = resolve_config_path(args.config.as_deref());
    let loaded = load_toml_config(&config_path);

    let level = args
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.logging.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Build identification immediately after tracing init
    info!(
        "Starting qrlink-gen v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Config file: {}", config_path.display());

    let toml_config = config_or_default(&config_path, loaded);
    let settings = PipelineSettings::resolve(&config_path, &toml_config);
    let pipeline = Pipeline::new(settings);

    let report = pipeline.run(PromptInput::stdin()).await;

    info!(
        run_id = %report.run_id,
        qr_written = report.artifact.success,
        summary = !report.api.is_absent(),
        persisted = report.persisted,
        degraded = ?report.failures.iter().map(|(stage, _)| stage.as_str()).collect::<Vec<_>>(),
        "Run finished"
    );

    Ok(())
}
