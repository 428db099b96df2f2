//! Domain Models
//!
//! Request-scoped types for a comparative market analysis: the inbound
//! request, fetched quotes, and the typed view of the AI's answer.
//! Uses `rust_decimal` for prices - never use f64 for money!

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AnalysisError, NO_INPUT_MESSAGE, Result};

/// Inbound analysis request (`POST /analyze_market`)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Price-feed identifiers (e.g., "bitcoin", "bitcoin-cash"), in order
    #[serde(default, deserialize_with = "null_as_default")]
    pub crypto_ids: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub crypto_market_news: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub gold_market_news: String,

    /// Base64 image bytes, no data-URL prefix
    #[serde(default, deserialize_with = "null_as_default")]
    pub chart_image_base64: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl AnalysisRequest {
    /// Parse a raw request body.
    ///
    /// An empty body, `null`, or `{}` means no input at all.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(AnalysisError::InvalidRequest(NO_INPUT_MESSAGE.into()));
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AnalysisError::InvalidRequest(format!("malformed JSON: {e}")))?;

        match &value {
            Value::Null => return Err(AnalysisError::InvalidRequest(NO_INPUT_MESSAGE.into())),
            Value::Object(map) if map.is_empty() => {
                return Err(AnalysisError::InvalidRequest(NO_INPUT_MESSAGE.into()));
            }
            Value::Object(_) => {}
            _ => {
                return Err(AnalysisError::InvalidRequest(
                    "request body must be a JSON object".into(),
                ));
            }
        }

        let request: Self = serde_json::from_value(value)
            .map_err(|e| AnalysisError::InvalidRequest(format!("invalid field: {e}")))?;
        Ok(request.normalized())
    }

    /// Trim free-text fields; whitespace-only becomes empty.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.crypto_market_news = self.crypto_market_news.trim().to_string();
        self.gold_market_news = self.gold_market_news.trim().to_string();
        self.chart_image_base64 = self.chart_image_base64.trim().to_string();
        self
    }

    pub fn chart_image(&self) -> Option<&str> {
        let image = self.chart_image_base64.trim();
        (!image.is_empty()).then_some(image)
    }
}

/// Current price of one requested asset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetQuote {
    /// Price-feed identifier as requested
    pub id: String,

    /// Human name derived from the id (e.g., "Bitcoin Cash")
    pub display_name: String,

    /// Price in the quote currency; `None` when the feed had no price
    pub price: Option<Decimal>,

    pub fetched_at: DateTime<Utc>,
}

impl AssetQuote {
    pub fn new(id: impl Into<String>, price: Option<Decimal>) -> Self {
        let id = id.into();
        Self {
            display_name: display_name(&id),
            id,
            price,
            fetched_at: Utc::now(),
        }
    }

    pub fn unpriced(id: impl Into<String>) -> Self {
        Self::new(id, None)
    }

    /// Price as a JSON value (`null` when absent)
    pub fn price_json(&self) -> Value {
        self.price.map_or(Value::Null, decimal_to_json)
    }
}

/// Derive a display name from a feed identifier.
///
/// Hyphens become spaces, then every letter that follows a non-letter is
/// upper-cased and every other letter lower-cased.
pub fn display_name(id: &str) -> String {
    let mut name = String::with_capacity(id.len());
    let mut after_letter = false;

    for c in id.chars().map(|c| if c == '-' { ' ' } else { c }) {
        if c.is_alphabetic() {
            if after_letter {
                name.extend(c.to_lowercase());
            } else {
                name.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            name.push(c);
            after_letter = false;
        }
    }

    name
}

/// Integral prices become JSON integers, fractional ones JSON floats.
pub fn decimal_to_json(value: Decimal) -> Value {
    let normalized = value.normalize();
    if let Some(int) = normalized.to_i64().filter(|_| normalized.scale() == 0) {
        return Value::from(int);
    }
    normalized
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

// ============================================================================
// Typed view of the AI answer
// ============================================================================

/// Recommended action for an asset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strategy {
    Buy,
    Sell,
    Hold,
}

/// Per-timeframe trading signal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// One asset in the ranking
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedAsset {
    pub asset_name: String,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub current_price: Option<Decimal>,

    /// Opportunity score, 0-100
    pub score: f64,

    pub strategy: Strategy,

    pub holding_period: String,

    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeSignal {
    pub timeframe: String,
    pub signal: Signal,
    pub risk: RiskLevel,
    pub reason: String,
}

/// Chart pattern detected in the attached image
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern: String,

    /// Model confidence, 0-100
    pub confidence: f64,

    pub description: String,
}

/// Full typed answer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Sorted descending by score
    pub ranked_assets: Vec<RankedAsset>,

    /// Markdown report
    pub detailed_analysis: String,

    #[serde(default)]
    pub multi_timeframe_analysis: Vec<TimeframeSignal>,

    #[serde(default)]
    pub pattern_recognition: Vec<PatternMatch>,
}
