//! Application State

use std::sync::Arc;

use market_analyzer::MarketAnalyzer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Price feed + AI provider pipeline
    pub analyzer: Arc<MarketAnalyzer>,
}

impl AppState {
    pub fn new(analyzer: MarketAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}
