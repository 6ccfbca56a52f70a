//! Bloomload - Main Entry Point
//! Load generator for the inventory item-creation endpoint

mod cli;
mod report;
mod settings;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

// Import workspace crates
use bloomload_core::application::{shutdown_channel, LoadTest};
use bloomload_core::domain::IterationContext;
use bloomload_core::port::time_provider::SystemTimeProvider;
use bloomload_core::port::FORM_CONTENT_TYPE;
use bloomload_infra_http::ReqwestSender;

use cli::{Cli, Commands, PreviewArgs, RunArgs};
use settings::{Overrides, Settings};
use telemetry::LogFormat;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    let _log_guard = telemetry::init_logging(LogFormat::from_env())?;
    info!("Bloomload v{} starting...", VERSION);

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Preview(args) => preview(args),
    }
}

async fn run(args: RunArgs) -> Result<()> {
    // 2. Load configuration
    let overrides = Overrides {
        scenario: args.common.scenario.clone(),
        vus: args.vus,
        duration: args.duration.clone(),
        min_pass_rate: args.min_pass_rate,
    };
    let settings = Settings::load(args.common.config.as_deref(), &overrides)?;
    let scenario = Arc::new(settings.scenario()?);
    let profile = settings.load_profile()?;

    for target in &scenario.targets {
        info!(
            target = %target.name,
            url = %target.url,
            timeout_secs = ?target.timeout.map(|t| t.as_secs_f64()),
            "Target configured"
        );
    }

    // 3. Setup dependencies (DI wiring)
    let sender = Arc::new(
        ReqwestSender::new(settings.http_config()?).context("HTTP client setup failed")?,
    );
    let time_provider = Arc::new(SystemTimeProvider);
    let load_test = LoadTest::new(profile, scenario, sender, time_provider);

    // 4. Stop early on Ctrl+C
    let (stop_tx, stop_rx) = shutdown_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received. Stopping virtual users...");
            stop_tx.shutdown();
        }
    });

    // 5. Run
    let summary = load_test.run(stop_rx).await?;

    // 6. Report
    println!("{}", report::render_summary(&summary));

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        info!(path = %path.display(), "Summary written");
    }

    if let Some(min_pass_rate) = settings.min_pass_rate {
        if !summary.meets_threshold(min_pass_rate) {
            anyhow::bail!(
                "check pass rate {:.2}% is below the required {:.2}%",
                summary.pass_rate() * 100.0,
                min_pass_rate * 100.0
            );
        }
    }

    Ok(())
}

fn preview(args: PreviewArgs) -> Result<()> {
    let overrides = Overrides {
        scenario: args.common.scenario.clone(),
        ..Overrides::default()
    };
    let settings = Settings::load(args.common.config.as_deref(), &overrides)?;
    let scenario = settings.scenario()?;

    let ctx = IterationContext::new(args.worker, args.iteration);
    let body = scenario.template.build(ctx).to_form()?;

    for target in &scenario.targets {
        let timeout = target
            .timeout
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "client default".to_string());
        println!("POST {}", target.url);
        println!("Content-Type: {}", FORM_CONTENT_TYPE);
        println!("Timeout: {}", timeout);
        println!("Check: {}", scenario.check_name(target));
        println!();
        println!("{}", body);
        println!();
    }
    println!("Then pause {:?}", scenario.pause);

    Ok(())
}
