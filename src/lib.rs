pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

/// Browser user agent sent to both upstreams. Requests without one are frequently rejected.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub enum AppCommand {
    Estimate,
    Watch { interval_secs: Option<u64> },
    Add(String),
    Remove(String),
    List,
    ClearCache,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fundest starting...");

    let path = AppConfig::resolve_path(config_path)?;
    let config = AppConfig::load_from_path(&path)?;
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Estimate => cli::estimate::run(&config).await,
        AppCommand::Watch { interval_secs } => {
            let interval = interval_secs
                .map(AppConfig::clamp_interval)
                .unwrap_or_else(|| config.refresh_interval());
            cli::estimate::watch(&config, &path, interval).await
        }
        AppCommand::Add(fund_id) => cli::funds::add(&path, &fund_id).map(|_| ()),
        AppCommand::Remove(fund_id) => {
            let cache = store::open_record_cache(&config);
            cli::funds::remove(&path, &fund_id, cache.as_ref())
                .await
                .map(|_| ())
        }
        AppCommand::List => {
            cli::funds::list(&config);
            Ok(())
        }
        AppCommand::ClearCache => {
            store::open_record_cache(&config).clear().await;
            println!("Cleared cached holdings.");
            Ok(())
        }
    }
}
