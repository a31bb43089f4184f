use crate::core::fund::FetchError;
use crate::core::quote::HoldingsSource;
use crate::providers::util::{RetryPolicy, fetch_body};
use async_trait::async_trait;
use tracing::{debug, instrument};

const REFERER: &str = "http://fundf10.eastmoney.com/";
/// Number of holdings rows requested per disclosure.
const TOP_LINES: u32 = 200;

/// Fetches quarterly holdings disclosures from the Eastmoney fund archive.
pub struct EastmoneyHoldingsSource {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl EastmoneyHoldingsSource {
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
}

#[async_trait]
impl HoldingsSource for EastmoneyHoldingsSource {
    #[instrument(name = "EastmoneyDisclosureFetch", skip(self), fields(fund_id = %fund_id))]
    async fn fetch_disclosure(&self, fund_id: &str) -> Result<String, FetchError> {
        let url = format!(
            "{}/FundArchivesDatas.aspx?type=jjcc&code={}&topline={}",
            self.base_url, fund_id, TOP_LINES
        );
        debug!("Requesting holdings disclosure from {}", url);

        let body = self
            .retry
            .run(&url, || {
                fetch_body(self.client.get(&url).header(reqwest::header::REFERER, REFERER))
            })
            .await
            .ok_or(FetchError::NetworkFailure)?;

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
