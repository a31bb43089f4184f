use super::ui;
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::fund::FundRecord;
use anyhow::Result;
use std::path::Path;

/// Adds a fund to the watchlist stored at `path`. Returns whether the list changed.
pub fn add(path: &Path, fund_id: &str) -> Result<bool> {
    let mut config = AppConfig::load_from_path(path)?;
    if !config.funds.add(fund_id) {
        println!("Fund '{}' is already monitored or invalid.", fund_id.trim());
        return Ok(false);
    }
    config.save_to_path(path)?;
    println!("Added fund {}.", fund_id.trim());
    Ok(true)
}

/// Removes a fund from the watchlist stored at `path` and drops its cached record.
/// Returns whether the list changed.
pub async fn remove(path: &Path, fund_id: &str, cache: &dyn Cache<String, FundRecord>) -> Result<bool> {
    let fund_id = fund_id.trim();
    let mut config = AppConfig::load_from_path(path)?;
    if !config.funds.remove(fund_id) {
        println!("Fund '{fund_id}' is not monitored.");
        return Ok(false);
    }
    config.save_to_path(path)?;
    cache.remove(&fund_id.to_string()).await;
    println!("Removed fund {fund_id}.");
    Ok(true)
}

pub fn list(config: &AppConfig) {
    if config.funds.is_empty() {
        println!("No funds are monitored. Add one with `fundest add <fund id>`.");
        return;
    }
    println!("{}", ui::style_text("Monitored funds", ui::StyleType::Title));
    for fund_id in config.funds.ids() {
        println!("  {fund_id}");
    }
}
