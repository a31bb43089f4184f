use super::ui;
use crate::core::config::AppConfig;
use crate::core::fund::FundRecord;
use crate::core::quote::QuoteMap;
use crate::core::refresh::{CycleReport, CycleSettings, FundOutcome, Orchestrator};
use crate::core::valuation::{Basis, ValuationResult};
use crate::providers::eastmoney::EastmoneyHoldingsSource;
use crate::providers::tencent::TencentQuoteProvider;
use crate::store;
use anyhow::Result;
use comfy_table::Cell;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator> {
    let holdings = EastmoneyHoldingsSource::new(&config.providers.eastmoney.base_url)?;
    let quotes = TencentQuoteProvider::new(&config.providers.tencent.base_url)?;
    Ok(Orchestrator::new(
        Arc::new(holdings),
        Arc::new(quotes),
        store::open_record_cache(config),
        CycleSettings {
            holdings_ttl: config.holdings_ttl(),
            fund_delay: config.fund_delay(),
        },
    ))
}

async fn run_cycle_with_progress(orchestrator: &Orchestrator, fund_ids: &[String]) -> CycleReport {
    let pb = ui::new_progress_bar(fund_ids.len() as u64);
    let report = orchestrator.run_cycle(fund_ids, &|| pb.inc(1)).await;
    pb.finish_and_clear();
    report
}

/// Runs a single refresh cycle and prints the estimates.
pub async fn run(config: &AppConfig) -> Result<()> {
    if config.funds.is_empty() {
        println!("No funds are monitored. Add one with `fundest add <fund id>`.");
        return Ok(());
    }
    let orchestrator = build_orchestrator(config)?;
    let report = run_cycle_with_progress(&orchestrator, config.funds.ids()).await;
    println!("{}", render_report(&report));
    Ok(())
}

/// Runs `cycle` every `interval` until `stop` resolves. `stop` is polled during each
/// cycle as well as during the pause between cycles.
pub async fn refresh_until<F, Fut>(
    interval: Duration,
    stop: impl Future<Output = ()>,
    mut cycle: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    tokio::pin!(stop);
    loop {
        tokio::select! {
            _ = &mut stop => return Ok(()),
            result = cycle() => result?,
        }
        tokio::select! {
            _ = &mut stop => return Ok(()),
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => debug!("Interrupted, stopping refresh loop"),
        Err(e) => {
            warn!("Could not listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Refreshes until interrupted. The watchlist is re-read from `config_path` every cycle
/// so funds added or removed meanwhile are picked up.
pub async fn watch(config: &AppConfig, config_path: &Path, interval: Duration) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let orchestrator = &orchestrator;

    refresh_until(interval, interrupted(), move || async move {
        let funds = match AppConfig::load_from_path(config_path) {
            Ok(latest) => latest.funds,
            Err(e) => {
                warn!("Using startup watchlist: {:#}", e);
                config.funds.clone()
            }
        };

        let report = run_cycle_with_progress(orchestrator, funds.ids()).await;
        console::Term::stdout().clear_screen()?;
        if funds.is_empty() {
            println!("No funds are monitored. Add one with `fundest add <fund id>`.");
        } else {
            println!("{}", render_report(&report));
        }
        println!(
            "{}",
            ui::style_text(
                &format!("Refreshing every {}s, press Ctrl-C to stop.", interval.as_secs()),
                ui::StyleType::Subtle
            )
        );
        Ok::<_, anyhow::Error>(())
    })
    .await
}

fn holdings_table(record: &FundRecord, quotes: &QuoteMap) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Code"),
        ui::header_cell("Weight"),
        ui::header_cell("Change"),
    ]);
    for holding in &record.holdings {
        table.add_row(vec![
            Cell::new(&holding.name),
            Cell::new(holding.code.raw()),
            ui::percent_cell(holding.weight),
            ui::change_cell(quotes.get(holding.symbol()).copied()),
        ]);
    }
    table.to_string()
}

fn basis_note(record: &FundRecord, valuation: &ValuationResult) -> Option<String> {
    if valuation.basis != Basis::IndexProxy {
        return None;
    }
    let note = match (&record.tracked_index, valuation.index_symbol) {
        (Some(index), Some(symbol)) => format!("ETF feeder fund tracking {index} ({symbol})"),
        (Some(index), None) => format!("ETF feeder fund tracking {index}"),
        (None, _) => "ETF feeder fund".to_string(),
    };
    Some(note)
}

pub fn render_fund(outcome: &FundOutcome, quotes: &QuoteMap) -> String {
    let mut output = String::new();
    match outcome {
        FundOutcome::Failed { error, .. } => {
            output.push_str(&format!(
                "{}\n",
                ui::style_text(
                    &format!("Fund {} failed to load", outcome.fund_id()),
                    ui::StyleType::Error
                )
            ));
            output.push_str(&format!(
                "{}\n",
                ui::style_text(&format!("Reason: {error}"), ui::StyleType::Subtle)
            ));
        }
        FundOutcome::Valued { record, valuation } => {
            output.push_str(&format!(
                "{}\n",
                ui::style_text(&record.name, ui::StyleType::Title)
            ));
            output.push_str(&format!(
                "{}\n",
                ui::style_text(
                    &format!("Code: {} | As of: {}", outcome.fund_id(), record.report_date),
                    ui::StyleType::Subtle
                )
            ));
            if let Some(note) = basis_note(record, valuation) {
                output.push_str(&format!("{}\n", ui::style_text(&note, ui::StyleType::Subtle)));
            }
            output.push_str(&format!(
                "Estimate: {} ({})\n",
                ui::style_change(valuation.estimate),
                valuation.basis
            ));
            if let Some(caveat) = &valuation.caveat {
                output.push_str(&format!(
                    "{}\n",
                    ui::style_text(&format!("⚠ {caveat}"), ui::StyleType::Warning)
                ));
            }
            if !record.holdings.is_empty() {
                output.push_str(&holdings_table(record, quotes));
                output.push('\n');
            }
        }
    }
    output
}

pub fn render_report(report: &CycleReport) -> String {
    let mut output = String::new();
    for outcome in &report.funds {
        output.push_str(&render_fund(outcome, &report.quotes));
        output.push('\n');
    }
    let quoted = report.requested_symbols - report.missing_symbols.len();
    output.push_str(&ui::style_text(
        &format!(
            "Quotes: {}/{} | Updated: {}",
            quoted,
            report.requested_symbols,
            chrono::Local::now().format("%H:%M:%S")
        ),
        ui::StyleType::Subtle,
    ));
    output
}
