//! # market-analyzer
//!
//! Comparative crypto and gold market analysis backed by a generative
//! model.
//!
//! ## Request Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  POST /analyze_market                                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  1. Price feed    bitcoin, ethereum ─► $97500, $3450         │
//! │  2. Prompt        assets + news + chart + output contract    │
//! │  3. LlmProvider   raw text reply                             │
//! │  4. Reconcile     first '{' .. last '}', overwrite prices    │
//! │  5. Audit         log schema deviations, never reject        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The model's `current_price` is never trusted: every ranked asset whose
//! name matches a requested id gets the fetched price written back, or
//! `null` when the feed had none.

pub mod error;
pub mod feed;
pub mod model;
pub mod prompt;
pub mod reconcile;
pub mod schema;
pub mod service;

pub use error::{AnalysisError, FeedError, NO_INPUT_MESSAGE, Result};
pub use feed::{CoinGeckoClient, CoinGeckoConfig, MockPriceFeed, PriceFeed, fetch_quotes};
pub use model::{AnalysisRequest, AnalysisResult, AssetQuote, PatternMatch, RankedAsset, TimeframeSignal};
pub use prompt::{Prompt, PromptInput, build_prompt};
pub use reconcile::{extract_json_object, reconcile, reconcile_prices};
pub use schema::{AuditReport, SchemaWarning, audit};
pub use service::MarketAnalyzer;
