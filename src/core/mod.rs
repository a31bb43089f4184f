//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod extract;
pub mod fund;
pub mod index;
pub mod log;
pub mod quote;
pub mod refresh;
pub mod symbol;
pub mod valuation;
pub mod watchlist;

// Re-export main types for cleaner imports
pub use fund::{FetchError, FundRecord, Holding, ReportDate};
pub use quote::{HoldingsSource, QuoteMap, QuoteProvider};
pub use valuation::{Basis, Caveat, Coverage, ValuationResult};
