use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fundest::core::config::AppConfig;
use fundest::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fundest::AppCommand {
    fn from(cmd: Commands) -> fundest::AppCommand {
        match cmd {
            Commands::Estimate => fundest::AppCommand::Estimate,
            Commands::Watch { interval } => fundest::AppCommand::Watch {
                interval_secs: interval,
            },
            Commands::Add { fund_id } => fundest::AppCommand::Add(fund_id),
            Commands::Remove { fund_id } => fundest::AppCommand::Remove(fund_id),
            Commands::List => fundest::AppCommand::List,
            Commands::ClearCache => fundest::AppCommand::ClearCache,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Estimate today's change for every monitored fund
    Estimate,
    /// Refresh estimates periodically until interrupted
    Watch {
        /// Seconds between refreshes (5 to 60)
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Add a fund to the watchlist
    Add { fund_id: String },
    /// Remove a fund from the watchlist
    Remove { fund_id: String },
    /// List monitored funds
    List,
    /// Drop all cached holdings
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => AppConfig::resolve_path(cli.config_path.as_deref())
            .and_then(fundest::cli::setup::setup_at_path),
        Some(cmd) => fundest::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
