//! One refresh cycle over the monitored funds.
//!
//! Records are taken from the cache when fresh, otherwise fetched and extracted one fund
//! at a time. The symbols every fund needs are then quoted in a single call, and each
//! fund is valued against that shared quote map.

use crate::core::cache::Cache;
use crate::core::extract;
use crate::core::fund::{FetchError, FundRecord};
use crate::core::quote::{HoldingsSource, QuoteMap, QuoteProvider};
use crate::core::valuation::{self, ValuationResult};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSettings {
    /// How long an extracted record may be served from cache.
    pub holdings_ttl: Duration,
    /// Pause after each disclosure fetch.
    pub fund_delay: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FundOutcome {
    Valued {
        record: FundRecord,
        valuation: ValuationResult,
    },
    Failed {
        fund_id: String,
        error: FetchError,
    },
}

impl FundOutcome {
    pub fn fund_id(&self) -> &str {
        match self {
            FundOutcome::Valued { record, .. } => &record.fund_id,
            FundOutcome::Failed { fund_id, .. } => fund_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// One outcome per monitored fund, in watchlist order.
    pub funds: Vec<FundOutcome>,
    pub quotes: QuoteMap,
    /// Symbols requested this cycle for which no quote came back.
    pub missing_symbols: Vec<String>,
    pub requested_symbols: usize,
}

pub struct Orchestrator {
    holdings: Arc<dyn HoldingsSource>,
    quotes: Arc<dyn QuoteProvider>,
    cache: Arc<dyn Cache<String, FundRecord>>,
    settings: CycleSettings,
}

impl Orchestrator {
    pub fn new(
        holdings: Arc<dyn HoldingsSource>,
        quotes: Arc<dyn QuoteProvider>,
        cache: Arc<dyn Cache<String, FundRecord>>,
        settings: CycleSettings,
    ) -> Self {
        Self {
            holdings,
            quotes,
            cache,
            settings,
        }
    }

    /// Returns a fund's record, from cache when fresh.
    async fn fund_record(&self, fund_id: &str) -> Result<FundRecord, FetchError> {
        if let Some(record) = self.cache.get(&fund_id.to_string()).await {
            return Ok(record);
        }

        let fetched = self.holdings.fetch_disclosure(fund_id).await;
        if !self.settings.fund_delay.is_zero() {
            tokio::time::sleep(self.settings.fund_delay).await;
        }
        let record = extract::extract(fund_id, &fetched?)?;

        self.cache
            .put(
                fund_id.to_string(),
                record.clone(),
                Some(self.settings.holdings_ttl),
            )
            .await;
        Ok(record)
    }

    /// Runs one cycle. `on_fund` is called after each fund's record is resolved.
    #[instrument(name = "RefreshCycle", skip_all, fields(funds = fund_ids.len()))]
    pub async fn run_cycle(&self, fund_ids: &[String], on_fund: &(dyn Fn() + Sync)) -> CycleReport {
        let mut records = Vec::with_capacity(fund_ids.len());
        let mut holding_symbols = BTreeSet::new();
        let mut index_symbols = BTreeSet::new();

        for fund_id in fund_ids {
            let record = self.fund_record(fund_id).await;
            match &record {
                Ok(record) if record.is_feeder => {
                    if let Some(symbol) = valuation::index_symbol(record) {
                        index_symbols.insert(symbol.to_string());
                    }
                }
                Ok(record) => {
                    holding_symbols.extend(record.holding_symbols().map(str::to_string));
                }
                Err(e) => warn!("Fund {} failed: {}", fund_id, e),
            }
            records.push((fund_id.clone(), record));
            on_fund();
        }

        let symbols: BTreeSet<String> = holding_symbols.union(&index_symbols).cloned().collect();
        let quotes = if symbols.is_empty() {
            QuoteMap::new()
        } else {
            self.quotes.fetch_quotes(&symbols).await
        };

        let missing_symbols: Vec<String> = symbols
            .iter()
            .filter(|s| !quotes.contains_key(*s))
            .cloned()
            .collect();
        info!(
            requested = symbols.len(),
            quoted = symbols.len() - missing_symbols.len(),
            "Quotes fetched"
        );
        if !missing_symbols.is_empty() {
            debug!("Missing quotes: {:?}", missing_symbols);
        }

        let funds = records
            .into_iter()
            .map(|(fund_id, record)| match record {
                Ok(record) => {
                    let valuation = valuation::estimate(&record, &quotes);
                    FundOutcome::Valued { record, valuation }
                }
                Err(error) => FundOutcome::Failed { fund_id, error },
            })
            .collect();

        CycleReport {
            funds,
            requested_symbols: symbols.len(),
            missing_symbols,
            quotes,
        }
    }
}
