//! digest-agents: run the content validation gates over generated records.
//!
//! # Usage
//!
//! ```bash
//! # Validate with settings from ENABLE_AGENT_VALIDATION and friends
//! digest-agents validate out/chat/2025-08-05.json
//!
//! # Canary rollout, annotated records written to a directory
//! digest-agents --preset canary validate --out-dir validated/ out/*.json
//!
//! # Stop validating as soon as an operator touches the flag file
//! digest-agents validate --kill-switch /tmp/AGENTS_OFF out/*.json
//!
//! # Which records would be sampled at 30%
//! digest-agents --enabled true --percentage 30 route https://example.com/a
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use digest_agents::batch::{self, BatchOptions};
use digest_agents::status;
use digest_agents::Overrides;
use gatekeeper::{RolloutPreset, ValidationPipeline};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Rollout preset (disabled, shadow, canary, full); replaces the environment's rollout settings
    #[arg(long, global = true)]
    preset: Option<RolloutPreset>,

    /// Enable or disable the gates (overrides ENABLE_AGENT_VALIDATION)
    #[arg(long, global = true)]
    enabled: Option<bool>,

    /// Percentage of content routed through the gates (overrides AGENT_VALIDATION_PERCENTAGE)
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=100))]
    percentage: Option<u8>,

    /// Observe-only mode: write records unchanged apart from the report (overrides AGENT_SHADOW_MODE)
    #[arg(long, global = true)]
    shadow: Option<bool>,

    /// Consecutive failures before the breaker opens (overrides AGENT_BREAKER_THRESHOLD)
    #[arg(long, global = true)]
    breaker_threshold: Option<u32>,

    /// TOML fix-up rule table replacing the built-in one
    #[arg(long, global = true, env = "AGENT_RULES_PATH")]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate JSON content records
    Validate {
        /// Record files to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Records validated concurrently
        #[arg(long, default_value_t = 4)]
        workers: usize,

        /// Write annotated records here instead of stdout
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Disable validation once this file exists
        #[arg(long)]
        kill_switch: Option<PathBuf>,
    },
    /// Print the resolved pipeline configuration
    Status {
        /// Emit JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show routing decisions for identifiers
    Route {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            preset: self.preset,
            enabled: self.enabled,
            percentage: self.percentage,
            shadow: self.shadow,
            failure_threshold: self.breaker_threshold,
            rules: self.rules.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let overrides = args.overrides();
    let config = overrides
        .resolve()
        .context("invalid agent pipeline configuration")?;
    let rules = overrides.load_rules().context("loading fix-up rules")?;
    let pipeline = Arc::new(ValidationPipeline::with_rules(config, rules));

    match args.command {
        Command::Validate {
            files,
            workers,
            out_dir,
            kill_switch,
        } => {
            let options = BatchOptions {
                workers,
                kill_switch,
            };
            run_validate(pipeline, files, &options, out_dir).await
        }
        Command::Status { json } => run_status(&pipeline, json),
        Command::Route { ids } => {
            for id in ids {
                println!("{id}\t{}", pipeline.route(&id));
            }
            Ok(())
        }
    }
}

async fn run_validate(
    pipeline: Arc<ValidationPipeline>,
    files: Vec<PathBuf>,
    options: &BatchOptions,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    info!(files = files.len(), workers = options.workers, "{}", pipeline.config());

    let total = files.len();
    let mut failed = 0usize;
    for outcome in batch::validate_files(Arc::clone(&pipeline), files, options).await {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{e:#}");
                failed += 1;
                continue;
            }
        };
        match out_dir.as_deref() {
            Some(dir) => {
                let target = batch::write_outcome(&outcome, dir)?;
                info!(file = %target.display(), "{}", outcome.report.summary());
            }
            None => println!("{}", serde_json::to_string(&outcome.output)?),
        }
    }

    let breaker = pipeline.breaker();
    info!(
        processed = total - failed,
        failed,
        breaker = %breaker.state,
        breaker_failures = breaker.failures,
        "Batch complete"
    );
    if failed > 0 {
        anyhow::bail!("{failed} of {total} record files could not be processed");
    }
    Ok(())
}

fn run_status(pipeline: &ValidationPipeline, json: bool) -> Result<()> {
    if json {
        let status = status::render_json(pipeline);
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{}", status::render_text(pipeline));
    }
    Ok(())
}
