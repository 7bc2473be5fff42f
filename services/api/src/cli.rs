use clap::{Args, Parser, Subcommand};
use sri_toolkit::error::AppError;

use crate::commands::{run_catalog, run_score, run_upgrade, CatalogArgs, ScoreArgs, UpgradeArgs};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "SRI Toolkit",
    about = "Score buildings with the Smart Readiness Indicator and plan upgrades",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a building configuration read from a JSON file
    Score(ScoreArgs),
    /// Search for level upgrades that lift a configuration to a target SRI
    Upgrade(UpgradeArgs),
    /// List domains, services and level counts of the reference data
    Catalog(CatalogArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Upgrade(args) => run_upgrade(args),
        Command::Catalog(args) => run_catalog(args),
    }
}
