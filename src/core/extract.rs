//! Turns a raw holdings disclosure payload into a [`FundRecord`].
//!
//! The payload is a script-style wrapper whose `content:"..."` field carries an escaped
//! HTML fragment with one table per reporting quarter. Only the most recent quarter is
//! parsed. Rows have no reliable schema, so each row is classified heuristically: a
//! security code anchors the row, the adjacent cell names it and the first percentage
//! cell gives its weight.

use crate::core::fund::{FetchError, FundRecord, Holding, MAX_HOLDINGS, ReportDate};
use crate::core::index::IndexResolver;
use crate::core::symbol::SecurityCode;
use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

const CONTENT_MARKER: &str = "content:\"";
const FEEDER_MARKER: &str = "ETF联接";
/// Rows shorter than this are totals, notes or pagination, never holdings.
const MIN_ROW_CELLS: usize = 5;
const NOISE_WORDS: [&str; 9] = [
    "详情", "行情", "股吧", "代码", "名称", "资讯", "比例", "序号", "占净值",
];

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"title='(.*?)'").expect("Invalid regex pattern"));
static QUARTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}年\d季度股票投资明细").expect("Invalid regex pattern")
});
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"截止至：(\d{4}-\d{2}-\d{2})").expect("Invalid regex pattern")
});
static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9,.\-%]+$").expect("Invalid regex pattern"));

static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("Invalid selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("Invalid selector"));
static CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("Invalid selector"));

/// The cell that identifies the security a row describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub index: usize,
    pub code: String,
}

/// Finds the security code cell of a table row.
///
/// A code is either 1–6 ASCII digits or 2–5 uppercase ASCII letters. Digit tokens shorter
/// than four characters in the first cell are row numbers, not codes.
pub fn classify_row<S: AsRef<str>>(cells: &[S]) -> Option<Anchor> {
    for (index, cell) in cells.iter().enumerate() {
        let value = cell.as_ref();
        let len = value.len();
        if value.bytes().all(|b| b.is_ascii_digit()) && (1..=6).contains(&len) {
            if index > 0 || len >= 4 {
                return Some(Anchor {
                    index,
                    code: value.to_string(),
                });
            }
        } else if (2..=5).contains(&len) && value.bytes().all(|b| b.is_ascii_uppercase()) {
            return Some(Anchor {
                index,
                code: value.to_string(),
            });
        }
    }
    None
}

/// Whether a cell can not be a security name: too short, a number or a header word.
pub fn is_noise(text: &str) -> bool {
    text.chars().count() < 2
        || NUMERIC_RE.is_match(text)
        || NOISE_WORDS.iter().any(|word| text.contains(word))
}

fn name_near<S: AsRef<str>>(cells: &[S], anchor: &Anchor) -> Option<String> {
    let next = cells.get(anchor.index + 1).map(AsRef::as_ref);
    let prev = anchor
        .index
        .checked_sub(1)
        .and_then(|i| cells.get(i))
        .map(AsRef::as_ref);
    [next, prev]
        .into_iter()
        .flatten()
        .find(|candidate| !is_noise(candidate))
        .map(str::to_string)
}

/// Weight from the first cell containing a percent sign, or 0 when it does not parse.
fn row_weight<S: AsRef<str>>(cells: &[S]) -> f64 {
    cells
        .iter()
        .map(AsRef::as_ref)
        .find(|cell| cell.contains('%'))
        .and_then(|cell| cell.replace(['%', ','], "").trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Builds a holding from a row, or `None` when the row does not describe one.
pub fn parse_row<S: AsRef<str>>(cells: &[S], fund_name: &str) -> Option<Holding> {
    if cells.len() < MIN_ROW_CELLS {
        return None;
    }
    let anchor = classify_row(cells)?;
    let name = name_near(cells, &anchor)?;
    let weight = row_weight(cells);
    if !(weight > 0.0 && weight <= 100.0) {
        return None;
    }
    Some(Holding {
        name,
        code: SecurityCode::new(&anchor.code, fund_name),
        weight,
    })
}

/// Returns the still-escaped fragment following the content marker.
fn embedded_fragment(payload: &str) -> Option<&str> {
    let start = payload.find(CONTENT_MARKER)? + CONTENT_MARKER.len();
    let rest = &payload[start..];
    let end = rest
        .match_indices("\",")
        .map(|(i, _)| i)
        .find(|&i| i == 0 || rest.as_bytes()[i - 1] != b'\\')
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn unescape(fragment: &str) -> String {
    fragment.replace("\\\"", "\"").replace("\\/", "/")
}

/// Keeps only the most recent quarter: everything before the second quarter header.
fn latest_quarter(fragment: &str) -> &str {
    match QUARTER_RE.find_iter(fragment).nth(1) {
        Some(second) => &fragment[..second.start()],
        None => fragment,
    }
}

fn report_date(fragment: &str) -> ReportDate {
    DATE_RE
        .captures(fragment)
        .and_then(|caps| NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok())
        .map_or(ReportDate::Latest, ReportDate::Disclosed)
}

fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.select(&CELL)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

fn parse_holdings(fragment: &str, fund_name: &str) -> Result<Vec<Holding>, FetchError> {
    let document = Html::parse_fragment(fragment);
    let mut tables = document.select(&TABLE).peekable();
    if tables.peek().is_none() {
        return Err(FetchError::ParseError(
            "no tables found in disclosure fragment".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut holdings: Vec<Holding> = tables
        .flat_map(|table| table.select(&ROW))
        .filter_map(|row| parse_row(&cell_texts(row), fund_name))
        .filter(|holding| seen.insert(holding.code.raw().to_string()))
        .collect();

    holdings.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    holdings.truncate(MAX_HOLDINGS);
    Ok(holdings)
}

/// Parses one fund's disclosure payload.
pub fn extract(fund_id: &str, payload: &str) -> Result<FundRecord, FetchError> {
    let fragment = embedded_fragment(payload).ok_or(FetchError::ContentBlocked)?;
    let fragment = unescape(fragment);

    let name = TITLE_RE
        .captures(&fragment)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| format!("基金{fund_id}"));

    let is_feeder = name.contains(FEEDER_MARKER);
    let tracked_index = if is_feeder {
        IndexResolver::global()
            .extract_index_name(&name)
            .map(str::to_string)
    } else {
        None
    };

    let fragment = latest_quarter(&fragment);
    let report_date = report_date(fragment);

    let holdings = if is_feeder {
        Vec::new()
    } else {
        let holdings = parse_holdings(fragment, &name)?;
        if holdings.is_empty() {
            return Err(FetchError::NoHoldingsFound);
        }
        holdings
    };

    debug!(
        fund_id,
        name = %name,
        is_feeder,
        tracked_index = ?tracked_index,
        holdings = holdings.len(),
        "Extracted fund record"
    );

    Ok(FundRecord {
        fund_id: fund_id.to_string(),
        name,
        report_date,
        is_feeder,
        tracked_index,
        holdings,
    })
}
