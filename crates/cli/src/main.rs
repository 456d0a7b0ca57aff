// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! metalus - a thin driver binary for the execution-plan scheduler.
//!
//! Accepts the driver configuration surface (§6): inline application JSON,
//! a file path, or stdin. Builds a plan, runs it to completion, and prints
//! each execution's terminal state.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod report;

use anyhow::{Context, Result};
use clap::Parser;
use metalus_config::{load_application, DriverConfig};
use metalus_core::{AuditTrail, NoopSecurityManager};
use metalus_engine::{default_registry, ExecutionPlanScheduler, PlanOutcome};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "metalus", version, about = "Run a Metalus application to completion")]
struct Cli {
    /// Path to an application JSON file
    #[arg(short = 'a', long = "application", value_name = "PATH")]
    application: Option<PathBuf>,

    /// Inline application JSON
    #[arg(long = "application-json", value_name = "JSON", conflicts_with = "application")]
    application_json: Option<String>,

    /// Emit the plan report as JSON instead of a text summary
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn driver_config(&self) -> Result<DriverConfig> {
        if let Some(json) = &self.application_json {
            return Ok(DriverConfig::from_inline_json(json.clone()));
        }
        if let Some(path) = &self.application {
            return Ok(DriverConfig::from_path(path.display().to_string()));
        }

        let mut stdin_json = String::new();
        std::io::stdin()
            .read_to_string(&mut stdin_json)
            .context("reading application JSON from stdin")?;
        Ok(DriverConfig::from_inline_json(stdin_json))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.driver_config()?;
    let application = load_application(&config).context("loading application")?;

    let scheduler = ExecutionPlanScheduler::from_application(
        &application,
        Arc::new(AuditTrail::new()),
        Arc::new(NoopSecurityManager),
        Arc::new(default_registry()),
        vec![metalus_engine::builtin_steps::PACKAGE.to_string()],
    )
    .context("building execution plan")?;

    let plan_report = scheduler.run().await.context("running execution plan")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report::report_to_json(&plan_report))?);
    } else {
        report::print_report(&plan_report);
    }

    match plan_report.outcome {
        PlanOutcome::Complete => Ok(()),
        _ => std::process::exit(2),
    }
}
