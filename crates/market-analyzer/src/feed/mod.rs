//! Price Feed Integration
//!
//! Abstraction over batched spot-price lookups, plus the best-effort
//! quote fetcher the analyzer runs before building a prompt.

mod coingecko;
mod mock;

pub use coingecko::{CoinGeckoClient, CoinGeckoConfig};
pub use mock::MockPriceFeed;

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::FeedError;
use crate::model::AssetQuote;

/// Price feed trait (Strategy pattern)
///
/// Implement this for each price source: CoinGecko, an exchange, a mock.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// One batched lookup. The map holds only the ids the feed priced.
    async fn simple_prices(&self, ids: &[String]) -> Result<HashMap<String, Decimal>, FeedError>;

    /// Check if the feed is reachable
    async fn health_check(&self) -> bool;

    /// Feed name
    fn name(&self) -> &str;
}

/// Fetch one quote per id, in input order.
///
/// Never fails: ids the feed doesn't price, and every id when the feed is
/// down, come back with `price: None`.
pub async fn fetch_quotes(feed: &dyn PriceFeed, ids: &[String]) -> Vec<AssetQuote> {
    if ids.is_empty() {
        return Vec::new();
    }

    match feed.simple_prices(ids).await {
        Ok(prices) => quotes_from_prices(ids, &prices),
        Err(e) => {
            tracing::warn!(feed = feed.name(), error = %e, "Error fetching prices, continuing without them");
            ids.iter().map(AssetQuote::unpriced).collect()
        }
    }
}

/// Pair each requested id with its price, if any.
pub fn quotes_from_prices(ids: &[String], prices: &HashMap<String, Decimal>) -> Vec<AssetQuote> {
    ids.iter()
        .map(|id| {
            let quote = AssetQuote::new(id.clone(), prices.get(id).copied());
            match quote.price {
                Some(price) => {
                    tracing::debug!(id = %id, %price, fetched_at = %quote.fetched_at, "Fetched quote");
                }
                None => {
                    tracing::warn!(id = %id, fetched_at = %quote.fetched_at, "Could not find price for crypto id");
                }
            }
            quote
        })
        .collect()
}
