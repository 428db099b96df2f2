//! Analysis Pipeline
//!
//! One request, one pass:
//!
//! ```text
//! AnalysisRequest ─► fetch_quotes ─► build_prompt ─► LlmProvider::complete
//!                                                          │
//!        JSON document ◄─ schema audit ◄─ reconcile ◄──────┘
//! ```
//!
//! Price lookups degrade silently. Everything after the prompt is built
//! fails the request.

use std::sync::Arc;

use analyst_core::{GenerationOptions, LlmProvider};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::feed::{PriceFeed, fetch_quotes};
use crate::model::AnalysisRequest;
use crate::prompt::{PromptInput, build_prompt};
use crate::reconcile::reconcile;
use crate::schema::audit;

/// Request-independent analysis service
pub struct MarketAnalyzer {
    feed: Arc<dyn PriceFeed>,
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl MarketAnalyzer {
    pub fn new(feed: Arc<dyn PriceFeed>, provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self {
            feed,
            provider,
            options,
        }
    }

    /// Use the provider's own model name
    pub fn with_defaults(feed: Arc<dyn PriceFeed>, provider: Arc<dyn LlmProvider>) -> Self {
        let options = GenerationOptions::for_model(provider.info().model);
        Self::new(feed, provider, options)
    }

    pub fn feed(&self) -> &dyn PriceFeed {
        self.feed.as_ref()
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Run one analysis and return the reconciled document.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<Value> {
        let span = tracing::info_span!("analyze", request_id = %Uuid::new_v4());
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: AnalysisRequest) -> Result<Value> {
        tracing::info!(
            assets = request.crypto_ids.len(),
            has_chart = request.chart_image().is_some(),
            "Starting market analysis"
        );

        let quotes = fetch_quotes(self.feed.as_ref(), &request.crypto_ids).await;
        let priced = quotes.iter().filter(|q| q.price.is_some()).count();
        tracing::debug!(priced, requested = quotes.len(), "Fetched quotes");

        let message = build_prompt(&PromptInput::from_request(&request, &quotes)).into_message();
        tracing::debug!(parts = message.parts.len(), image = message.has_inline_data(), "Built prompt");

        let completion = self
            .provider
            .complete(&[message], &self.options)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "AI generation failed"))?;

        let document = reconcile(&completion.content, &quotes)?;

        let report = audit(&document);
        for warning in &report.warnings {
            tracing::warn!(%warning, "AI response deviates from the expected schema");
        }

        tracing::info!(schema_clean = report.is_clean(), "Market analysis complete");
        Ok(document)
    }
}
