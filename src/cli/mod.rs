//! CLI for the agent chain service
//!
//! - `serve`: run the HTTP API
//! - `run`: run one chain against the seeded stores
//! - `check-condition`: parse and evaluate a step condition

pub mod check_condition;
pub mod run;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Tenant-scoped agent chains
#[derive(Parser)]
#[command(name = "tenant-agent-chains")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve,

    /// Run a chain once and print its result as JSON
    Run(run::RunArgs),

    /// Parse a condition and evaluate it against a JSON context
    CheckCondition(check_condition::CheckConditionArgs),
}

/// Load `.env` and configuration, then install logging
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}
