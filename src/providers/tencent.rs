//! Live percent-change quotes from the Tencent quote service.
//!
//! The service answers `GET /q=sym1,sym2,...` with GBK text made of `;`-separated
//! assignments such as `v_sh600519="1~贵州茅台~600519~...";`. Fields inside the quoted
//! value are `~`-separated.

use crate::core::quote::{QuoteMap, QuoteProvider};
use crate::providers::util::{RetryPolicy, fetch_body};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::BTreeSet;
use tracing::{debug, instrument, warn};

pub const BATCH_SIZE: usize = 60;
const REFERER: &str = "http://finance.qq.com/";
const MIN_FIELDS: usize = 6;
/// Percent change field for the simplified US quote layout.
const US_CHANGE_FIELD: usize = 5;
/// Percent change field for the full mainland/Hong Kong quote layout.
const CHANGE_FIELD: usize = 32;

/// Market prefixes as they appear in the variable name, and the symbol prefix they map to.
const MARKETS: [(&str, &str); 5] = [
    ("_sh", "sh"),
    ("_sz", "sz"),
    ("_hk", "r_hk"),
    ("_us", "s_us"),
    ("_bj", "bj"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRecord {
    pub symbol: String,
    pub change_pct: f64,
}

fn symbol_from_variable(variable: &str) -> Option<String> {
    MARKETS.iter().find_map(|(marker, prefix)| {
        variable
            .split_once(marker)
            .map(|(_, code)| format!("{prefix}{code}"))
    })
}

fn decode_line(line: &str) -> Option<QuoteRecord> {
    let (variable, data) = line.split_once("=\"")?;
    let symbol = symbol_from_variable(variable.trim())?;
    let fields: Vec<&str> = data.trim_end_matches('"').split('~').collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let offset = if symbol.starts_with("s_us") {
        US_CHANGE_FIELD
    } else {
        CHANGE_FIELD
    };
    let change_pct = match fields.get(offset).map(|f| f.trim()) {
        None | Some("") => 0.0,
        Some(field) => field.parse::<f64>().ok()?,
    };
    Some(QuoteRecord { symbol, change_pct })
}

/// Decodes a quote response body. Lines that do not parse are skipped.
pub fn decode_quotes(text: &str) -> Vec<QuoteRecord> {
    text.split(';')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(decode_line)
        .collect()
}

pub struct TencentQuoteProvider {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl TencentQuoteProvider {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::with_retry_policy(base_url, RetryPolicy::default())
    }

    pub fn with_retry_policy(base_url: &str, retry: RetryPolicy) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry,
        })
    }

    #[instrument(name = "TencentBatch", skip(self, batch), fields(size = batch.len()))]
    async fn fetch_batch(&self, batch: &[&str]) -> Vec<QuoteRecord> {
        let url = format!("{}/q={}", self.base_url, batch.join(","));
        debug!("Requesting quotes from {}", url);

        let body = self
            .retry
            .run(&url, || {
                fetch_body(self.client.get(&url).header(reqwest::header::REFERER, REFERER))
            })
            .await;

        match body {
            Some(bytes) => {
                let (text, _, had_errors) = encoding_rs::GBK.decode(&bytes);
                if had_errors {
                    debug!("Quote response contained invalid GBK sequences");
                }
                decode_quotes(&text)
            }
            None => {
                warn!("Dropping quote batch of {} symbols", batch.len());
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl QuoteProvider for TencentQuoteProvider {
    async fn fetch_quotes(&self, symbols: &BTreeSet<String>) -> QuoteMap {
        if symbols.is_empty() {
            return QuoteMap::new();
        }
        let ordered: Vec<&str> = symbols.iter().map(String::as_str).collect();
        let batches = ordered.chunks(BATCH_SIZE).map(|batch| self.fetch_batch(batch));

        let quotes: QuoteMap = join_all(batches)
            .await
            .into_iter()
            .flatten()
            .map(|record| (record.symbol, record.change_pct))
            .collect();
        debug!("Fetched {}/{} quotes", quotes.len(), symbols.len());
        quotes
    }
}
