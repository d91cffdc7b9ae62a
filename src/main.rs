// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use chart_builder::config::Config;
use chart_builder::console::Console;
use chart_builder::pipeline;
use chart_builder::reporting::{reporter, DeploymentEvent};

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = Config::load();
    init_tracing(config.verbose);

    let reporter = match reporter(
        config.reporting_platform.as_deref(),
        &config.reporting_settings(),
    ) {
        Ok(reporter) => reporter,
        Err(e) => {
            error!("{}", e);
            return Ok(ExitCode::from(2));
        }
    };
    info!("Reporting deployment status to {}", reporter.name());

    let mut console = Console::stdout();
    let started = Instant::now();

    let result = match config.plan() {
        Ok(plan) => pipeline::run(&plan, &mut console).await,
        Err(e) => Err(e),
    }
    .map_err(anyhow::Error::from);

    console.summary(started.elapsed());

    let tags = config.event_tags();
    let event = match &result {
        Ok(()) => DeploymentEvent::success(tags),
        Err(e) => DeploymentEvent::error(format!("An operation failed:\n{:?}", e), tags),
    }
    .with_pipeline_from_env();

    match reporter.post_event(&event).await {
        Ok(()) if reporter.name() != "Local" => {
            console.success(&format!("Deployment status reported to {}", reporter.name()))
        }
        Ok(()) => {}
        Err(e) => warn!("Failed to report deployment status: {}", e),
    }

    if let Err(e) = result {
        error!("Deployment failed: {:#}", e);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
