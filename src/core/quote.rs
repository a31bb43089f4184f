//! Data source abstractions and core types

use crate::core::fund::FetchError;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};

/// Percent change keyed by provider symbol. A missing symbol reads as 0.0.
pub type QuoteMap = HashMap<String, f64>;

pub fn quote_or_zero(quotes: &QuoteMap, symbol: &str) -> f64 {
    quotes.get(symbol).copied().unwrap_or(0.0)
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetches quotes for as many of `symbols` as possible. Symbols that could not be
    /// fetched are absent from the result.
    async fn fetch_quotes(&self, symbols: &BTreeSet<String>) -> QuoteMap;
}

#[async_trait]
pub trait HoldingsSource: Send + Sync {
    /// Fetches the raw disclosure payload for a fund.
    async fn fetch_disclosure(&self, fund_id: &str) -> Result<String, FetchError>;
}
