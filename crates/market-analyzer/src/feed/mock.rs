//! Mock Price Feed
//!
//! For testing and demo purposes. Returns realistic static prices keyed by
//! CoinGecko-style ids.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::PriceFeed;
use crate::error::FeedError;

/// Mock price feed with static prices
pub struct MockPriceFeed {
    prices: HashMap<String, Decimal>,
    failing: bool,
    calls: AtomicUsize,
}

impl Default for MockPriceFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPriceFeed {
    /// Feed preloaded with a handful of large caps
    pub fn new() -> Self {
        Self::with_prices([
            ("bitcoin", dec!(97500)),
            ("ethereum", dec!(3450)),
            ("solana", dec!(195)),
            ("cardano", dec!(0.95)),
            ("polkadot", dec!(7.20)),
            ("chainlink", dec!(24.50)),
            ("avalanche-2", dec!(42.00)),
            ("ripple", dec!(2.35)),
            ("dogecoin", dec!(0.38)),
            ("shiba-inu", dec!(0.000022)),
            ("litecoin", dec!(105)),
            ("bitcoin-cash", dec!(485)),
        ])
    }

    /// Feed that knows exactly these prices
    pub fn with_prices<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        Self {
            prices: prices.into_iter().map(|(id, p)| (id.into(), p)).collect(),
            failing: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Feed whose every lookup fails
    pub fn failing() -> Self {
        Self {
            prices: HashMap::new(),
            failing: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of lookups served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceFeed for MockPriceFeed {
    async fn simple_prices(&self, ids: &[String]) -> Result<HashMap<String, Decimal>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing {
            return Err(FeedError::Unavailable("mock feed configured to fail".into()));
        }

        Ok(ids
            .iter()
            .filter_map(|id| self.prices.get(id).map(|p| (id.clone(), *p)))
            .collect())
    }

    async fn health_check(&self) -> bool {
        !self.failing
    }

    fn name(&self) -> &str {
        "MockFeed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_feed() {
        let feed = MockPriceFeed::new();

        let prices = feed
            .simple_prices(&["bitcoin".into(), "notreal".into()])
            .await
            .unwrap();

        assert_eq!(prices.get("bitcoin"), Some(&dec!(97500)));
        assert!(!prices.contains_key("notreal"));
        assert_eq!(feed.calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_feed() {
        let feed = MockPriceFeed::failing();
        assert!(feed.simple_prices(&["bitcoin".into()]).await.is_err());
        assert!(!feed.health_check().await);
    }
}
