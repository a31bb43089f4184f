//! Estimates a fund's intraday change from its record and the cycle's quotes.

use crate::core::fund::FundRecord;
use crate::core::index::IndexResolver;
use crate::core::quote::{QuoteMap, quote_or_zero};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    HoldingsWeighted,
    IndexProxy,
}

impl Display for Basis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Basis::HoldingsWeighted => write!(f, "holdings-weighted"),
            Basis::IndexProxy => write!(f, "index-proxy"),
        }
    }
}

/// How many holdings had a non-zero quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    pub quoted: usize,
    pub total: usize,
}

impl Coverage {
    pub fn is_complete(&self) -> bool {
        self.quoted >= self.total
    }
}

/// Informational notes attached to an estimate that was still computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caveat {
    /// A feeder fund whose tracked index name, or its quote symbol, is unknown.
    UnresolvedIndex { name: Option<String> },
    PartialQuoteCoverage(Coverage),
    ZeroTotalWeight,
}

impl Display for Caveat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Caveat::UnresolvedIndex { name: Some(name) } => {
                write!(f, "no quote symbol known for index '{name}'")
            }
            Caveat::UnresolvedIndex { name: None } => {
                write!(f, "could not identify the tracked index")
            }
            Caveat::PartialQuoteCoverage(c) => {
                write!(f, "quotes available for {}/{} holdings", c.quoted, c.total)
            }
            Caveat::ZeroTotalWeight => write!(f, "holdings carry no weight"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValuationResult {
    /// Estimated change in percent.
    pub estimate: f64,
    pub basis: Basis,
    /// Only set for [`Basis::HoldingsWeighted`].
    pub coverage: Option<Coverage>,
    pub caveat: Option<Caveat>,
    /// Quote symbol used for [`Basis::IndexProxy`].
    pub index_symbol: Option<&'static str>,
}

/// Quote symbol of the index a feeder fund tracks, if both name and code are known.
pub fn index_symbol(record: &FundRecord) -> Option<&'static str> {
    record
        .tracked_index
        .as_deref()
        .and_then(|name| IndexResolver::global().resolve_code(name))
}

fn index_proxy(record: &FundRecord, quotes: &QuoteMap) -> ValuationResult {
    match index_symbol(record) {
        Some(symbol) => ValuationResult {
            estimate: quote_or_zero(quotes, symbol),
            basis: Basis::IndexProxy,
            coverage: None,
            caveat: None,
            index_symbol: Some(symbol),
        },
        None => ValuationResult {
            estimate: 0.0,
            basis: Basis::IndexProxy,
            coverage: None,
            caveat: Some(Caveat::UnresolvedIndex {
                name: record.tracked_index.clone(),
            }),
            index_symbol: None,
        },
    }
}

/// Weighted average of the holdings' quotes.
///
/// The divisor is the sum of the retained holdings' weights rather than the fund's full
/// equity allocation, so the estimate scales up to the top holdings.
fn holdings_weighted(record: &FundRecord, quotes: &QuoteMap) -> ValuationResult {
    let total_weight = record.total_weight();
    let quoted = record
        .holdings
        .iter()
        .filter(|h| quote_or_zero(quotes, h.symbol()) != 0.0)
        .count();
    let coverage = Coverage {
        quoted,
        total: record.holdings.len(),
    };

    if total_weight <= 0.0 {
        return ValuationResult {
            estimate: 0.0,
            basis: Basis::HoldingsWeighted,
            coverage: Some(coverage),
            caveat: Some(Caveat::ZeroTotalWeight),
            index_symbol: None,
        };
    }

    let weighted: f64 = record
        .holdings
        .iter()
        .map(|h| h.weight * quote_or_zero(quotes, h.symbol()))
        .sum();

    ValuationResult {
        estimate: weighted / total_weight,
        basis: Basis::HoldingsWeighted,
        coverage: Some(coverage),
        caveat: (!coverage.is_complete()).then_some(Caveat::PartialQuoteCoverage(coverage)),
        index_symbol: None,
    }
}

pub fn estimate(record: &FundRecord, quotes: &QuoteMap) -> ValuationResult {
    if record.is_feeder {
        index_proxy(record, quotes)
    } else {
        holdings_weighted(record, quotes)
    }
}
