//! # analyst-runtime
//!
//! Runtime providers for the market analyst backend.
//!
//! ## Providers
//!
//! - **Gemini** (default): Google Generative Language API, text + vision
//! - **Mock**: canned replies for tests and offline demos
//!
//! ## Usage
//!
//! ```rust,ignore
//! use analyst_runtime::{GeminiConfig, GeminiProvider};
//!
//! let provider = GeminiProvider::from_config(GeminiConfig::from_env()?)?;
//! let analyzer = MarketAnalyzer::new(feed, Arc::new(provider), options);
//! ```

#[cfg(feature = "gemini")]
pub mod gemini;
pub mod mock;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiProvider};
pub use mock::{MockProvider, MockReply};

// Re-export core types for convenience
pub use analyst_core::{Completion, GenerationOptions, LlmError, LlmProvider, Message, Result};
