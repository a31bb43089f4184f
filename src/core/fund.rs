//! Fund holdings records and the ways building one can fail.

use crate::core::symbol::SecurityCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

/// Upper bound on the holdings kept per fund, heaviest first.
pub const MAX_HOLDINGS: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub name: String,
    pub code: SecurityCode,
    /// Percent of net assets.
    pub weight: f64,
}

impl Holding {
    pub fn symbol(&self) -> &str {
        self.code.symbol()
    }
}

/// Date of the disclosure the holdings were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportDate {
    Disclosed(NaiveDate),
    /// The disclosure did not state a date.
    Latest,
}

impl Display for ReportDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportDate::Disclosed(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            ReportDate::Latest => write!(f, "latest"),
        }
    }
}

/// A fund's most recent disclosed holdings.
///
/// Feeder funds carry no holdings; their estimate comes from `tracked_index` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundRecord {
    pub fund_id: String,
    pub name: String,
    pub report_date: ReportDate,
    pub is_feeder: bool,
    pub tracked_index: Option<String>,
    pub holdings: Vec<Holding>,
}

impl FundRecord {
    /// Provider symbols of every holding, in holding order.
    pub fn holding_symbols(&self) -> impl Iterator<Item = &str> {
        self.holdings.iter().map(Holding::symbol)
    }

    pub fn total_weight(&self) -> f64 {
        self.holdings.iter().map(|h| h.weight).sum()
    }
}

/// Why no record could be produced for a fund.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network failure: all attempts to reach the holdings source failed")]
    NetworkFailure,
    #[error("content blocked: the disclosure payload is missing its embedded content")]
    ContentBlocked,
    #[error("no holdings found in the disclosure")]
    NoHoldingsFound,
    #[error("parse error: {0}")]
    ParseError(String),
}
