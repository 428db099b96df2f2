//! CoinGecko Price Feed
//!
//! Batched spot prices from the CoinGecko `simple/price` endpoint.
//! - Public API: no key, tight rate limits
//! - Demo API: free key with `CG-` prefix, sent as `x-cg-demo-api-key`
//! - Pro API: paid key, sent as `x-cg-pro-api-key`

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;

use super::PriceFeed;
use crate::error::FeedError;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_CURRENCY: &str = "usd";

/// CoinGecko client configuration
#[derive(Clone)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Quote currency, lower case (e.g., "usd")
    pub currency: String,
}

impl std::fmt::Debug for CoinGeckoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinGeckoConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("currency", &self.currency)
            .finish()
    }
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: None,
            currency: DEFAULT_CURRENCY.into(),
        }
    }
}

impl CoinGeckoConfig {
    /// Read `COINGECKO_BASE_URL`, `COINGECKO_API_KEY` and `PRICE_CURRENCY`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self::default();
        if let Some(base_url) = non_empty("COINGECKO_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        config.api_key = non_empty("COINGECKO_API_KEY");
        if let Some(currency) = non_empty("PRICE_CURRENCY") {
            config.currency = currency.to_lowercase();
        }
        config
    }
}

/// CoinGecko price feed client
pub struct CoinGeckoClient {
    client: Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoClient {
    pub fn new(config: CoinGeckoConfig) -> Result<Self, FeedError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CoinGeckoConfig {
        &self.config
    }

    fn request(&self, url: String) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url).header("Accept", "application/json");

        if let Some(key) = &self.config.api_key {
            if key.starts_with("CG-") {
                request = request.header("x-cg-demo-api-key", key);
            } else {
                request = request.header("x-cg-pro-api-key", key);
            }
        }
        request
    }

    /// Keep only ids that carry a price in the configured currency
    fn extract_prices(
        &self,
        data: HashMap<String, HashMap<String, Option<Decimal>>>,
    ) -> HashMap<String, Decimal> {
        data.into_iter()
            .filter_map(|(id, mut values)| {
                values
                    .remove(&self.config.currency)
                    .flatten()
                    .map(|price| (id, price))
            })
            .collect()
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoClient {
    async fn simple_prices(&self, ids: &[String]) -> Result<HashMap<String, Decimal>, FeedError> {
        let url = format!("{}/simple/price", self.config.base_url);

        let response = self
            .request(url)
            .query(&[
                ("ids", ids.join(",").as_str()),
                ("vs_currencies", self.config.currency.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let data: HashMap<String, HashMap<String, Option<Decimal>>> = response.json().await?;
        Ok(self.extract_prices(data))
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/ping", self.config.base_url);
        match self.request(url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::warn!("CoinGecko health check failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "CoinGecko"
    }
}
