use clap::Parser;
use tenant_agent_chains::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Run(args) => cli::run::run(args).await,
        Command::CheckCondition(args) => cli::check_condition::run(args),
    }
}
