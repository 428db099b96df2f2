//! # analyst-core
//!
//! Provider-agnostic LLM abstraction for the market analyst backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     MarketAnalyzer                           │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │   Prompt    │  │   Message   │  │   LlmProvider       │  │
//! │  │   Builder   │──│  (parts)    │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Gemini, a canned mock,
//! or any other backend without changing analysis logic.

pub mod error;
pub mod message;
pub mod provider;

pub use error::{LlmError, Result};
pub use message::{ContentPart, Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider, ProviderInfo};
