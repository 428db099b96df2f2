//! Prompt Builder
//!
//! Pure assembly of the analysis instruction: fixed persona and output
//! contract, the request's data sections (each only when present), the
//! field-by-field task instructions, and one worked example.

use analyst_core::{ContentPart, Message};

use crate::model::{AnalysisRequest, AssetQuote};

/// Persona and top-level output contract
pub const PREAMBLE: &str = "You are an elite quantitative financial analyst at a hedge fund. \
Your task is to perform a comparative analysis of the assets provided (cryptocurrencies, gold) \
to determine the best investment opportunity right now.
The input you receive may be real-time price data, market news, and/or a price chart image.
Your output MUST be a single strict JSON object and must not include any text outside the JSON. \
The JSON must have two primary keys: 'ranked_assets' and 'detailed_analysis'.

--- INPUT DATA FOR ANALYSIS ---";

pub const ASSETS_HEADING: &str = "\n**Cryptocurrency Assets:**";
pub const CRYPTO_NEWS_HEADING: &str = "\n**General Crypto News/Trend Context:**";
pub const GOLD_HEADING: &str = "\n**Gold Asset:**\n- Gold market news/trend context:";
pub const CHART_HEADING: &str = "\n**Additional Context from Price Chart:**";

const CHART_INSTRUCTION: &str = "A price chart is also attached. Use technical analysis of this chart \
(patterns, indicators, volume) as one of the main factors in your assessment of ALL relevant assets.";

/// Field-by-field contract for the two primary keys
pub const TASK_INSTRUCTIONS: &str = r#"

--- TASK AND JSON OUTPUT FORMAT ---
1.  **For the 'ranked_assets' key:**
    - Create a JSON array.
    - For EVERY input asset (including Gold if gold news was provided), create a JSON object with the following fields:
      - `asset_name`: (string) Asset name (e.g., 'Bitcoin', 'Ethereum', 'Gold').
      - `current_price`: (number or null) Current price, or null if unavailable.
      - `score`: (number) 'Opportunity Score' from 0-100. It reflects the current upside potential versus risk. High score = strong buy opportunity. Low score = sell or avoid signal.
      - `strategy`: (string) A clear strategy recommendation: 'BUY', 'SELL', or 'HOLD'.
      - `holding_period`: (string) Suggested trading duration for this strategy. If the best opportunity is scalping, use a very short time format (e.g., 'Scalping (5-30 minutes)', 'Scalping (15-60 minutes)', or 'Scalping (1-3 hours)'). Do not call scalping 'short term'.
      - `reason`: (string) One concise, strong sentence stating the main reason for the score. Example: 'Just broke a strong resistance level backed by high volume.' or 'Pressured by negative market sentiment from regulatory news.'
    - Sort this array from the highest score to the lowest.

2.  **For the 'detailed_analysis' key:**
    - Write an in-depth analysis as well-structured Markdown text.
    - Start with a general comparison summary.
    - For each asset, create a separate section with a Markdown heading (e.g., `### Deep Dive: Bitcoin`).
    - Inside each asset section, use sub-headings (e.g., `#### Technical Analysis (Chart):`, `#### Fundamental Analysis (News & Sentiment):`, `#### Scenarios & Risks:`) to break down your analysis.
    - Add a dedicated sub-heading `#### Scalping Recommendation (Entry, Exit, SL, TP, Logic, Risk):` containing:
        - Recommended entry, exit, stop loss, and take profit levels (where possible).
        - The technical logic (support/resistance, candlesticks, volume, etc.) relevant for scalping.
        - Risk and money management tips for scalpers.
    - The explanation must be very detailed, logical, and connect all input data (prices, news, chart).
    - End with an overall strategic conclusion and an investment disclaimer.

3.  **Multi-Timeframe Analysis (mandatory key 'multi_timeframe_analysis'):**
    - Add the key 'multi_timeframe_analysis' (array) to the JSON output.
    - Create exactly one object for each of these timeframes: 'Scalping (1-5 minutes)', 'Intraday (15-60 minutes)', 'Swing (4 hours - daily)'.
    - Each object has the fields: 'timeframe' (string), 'signal' ('BUY', 'SELL', 'HOLD' or 'NEUTRAL'), 'risk' ('HIGH', 'MEDIUM' or 'LOW'), and 'reason' (the main technical/sentiment explanation).

4.  **Automatic Pattern Recognition (mandatory key 'pattern_recognition'):**
    - If a chart image is attached, detect popular patterns (double top, head & shoulders, triangle, engulfing, etc.) and list them in the key 'pattern_recognition' (array).
    - For each detected pattern, create an object with the fields: 'pattern' (pattern name), 'confidence' (your confidence, 0-100), and 'description' (what the pattern implies).
    - If no chart is attached or no clear pattern is found, use an empty array.

Make sure all four keys ('ranked_assets', 'detailed_analysis', 'multi_timeframe_analysis', 'pattern_recognition') are present in the single top-level JSON object.

Example of the JSON output you must produce:"#;

/// Worked example anchoring the output format
pub const OUTPUT_EXAMPLE: &str = r####"
{
  "ranked_assets": [
    {
      "asset_name": "Solana",
      "current_price": 150.25,
      "score": 85,
      "strategy": "BUY",
      "holding_period": "Scalping (15-30 minutes)",
      "reason": "High volume at a support zone, a scalping opportunity with attractive risk-reward."
    },
    {
      "asset_name": "Gold",
      "current_price": null,
      "score": 55,
      "strategy": "HOLD",
      "holding_period": "Swing (3-5 days)",
      "reason": "Safe-haven demand is steady but momentum is fading near resistance."
    }
  ],
  "detailed_analysis": "### Deep Dive: Solana\n#### Technical Analysis (Chart):\n...\n#### Scalping Recommendation (Entry, Exit, SL, TP, Logic, Risk):\n- Entry: 150.10\n- Exit: 150.60\n- Stop Loss: 149.80\n- Take Profit: 150.80\nLogic: High-volume breakout at support, reversal candlestick.\nRisk: Avoid over-leverage, use a trailing stop if volatility is high.",
  "multi_timeframe_analysis": [
    { "timeframe": "Scalping (1-5 minutes)", "signal": "BUY", "risk": "HIGH", "reason": "High-volume breakout at support." },
    { "timeframe": "Intraday (15-60 minutes)", "signal": "HOLD", "risk": "MEDIUM", "reason": "Price is consolidating, no strong signal yet." },
    { "timeframe": "Swing (4 hours - daily)", "signal": "SELL", "risk": "HIGH", "reason": "RSI divergence and a reversal pattern." }
  ],
  "pattern_recognition": [
    { "pattern": "Bullish Engulfing", "confidence": 90, "description": "Potential strong upward reversal." },
    { "pattern": "Head & Shoulders", "confidence": 75, "description": "Signals a downward trend reversal." }
  ]
}"####;

pub const CLOSING_INSTRUCTION: &str = "\nMake sure your JSON is valid. Start your response with `{` and end it with `}`. \
Do not add '```json' or any other commentary outside the JSON object.";

/// Everything the builder reads
#[derive(Clone, Copy, Debug)]
pub struct PromptInput<'a> {
    pub quotes: &'a [AssetQuote],
    pub crypto_news: &'a str,
    pub gold_news: &'a str,
    pub chart_image: Option<&'a str>,
}

impl<'a> PromptInput<'a> {
    pub fn from_request(request: &'a AnalysisRequest, quotes: &'a [AssetQuote]) -> Self {
        Self {
            quotes,
            crypto_news: &request.crypto_market_news,
            gold_news: &request.gold_market_news,
            chart_image: request.chart_image(),
        }
    }
}

/// Instruction text plus optional image attachment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub image: Option<ContentPart>,
}

impl Prompt {
    /// Single user message: text first, image second
    pub fn into_message(self) -> Message {
        let message = Message::user(self.text);
        match self.image {
            Some(image) => message.with_part(image),
            None => message,
        }
    }
}

/// Assemble the prompt for one request.
pub fn build_prompt(input: &PromptInput<'_>) -> Prompt {
    let mut sections: Vec<String> = vec![PREAMBLE.to_string()];

    if !input.quotes.is_empty() {
        sections.push(ASSETS_HEADING.to_string());
        sections.extend(input.quotes.iter().map(asset_line));
    }

    let crypto_news = input.crypto_news.trim();
    if !crypto_news.is_empty() {
        sections.push(format!("{CRYPTO_NEWS_HEADING}\n{crypto_news}"));
    }

    let gold_news = input.gold_news.trim();
    if !gold_news.is_empty() {
        sections.push(format!("{GOLD_HEADING}\n{gold_news}"));
    }

    let image = input.chart_image.map(str::trim).filter(|i| !i.is_empty());
    if image.is_some() {
        sections.push(format!("{CHART_HEADING}\n{CHART_INSTRUCTION}"));
    }

    sections.push(TASK_INSTRUCTIONS.to_string());
    sections.push(OUTPUT_EXAMPLE.to_string());
    sections.push(CLOSING_INSTRUCTION.to_string());

    Prompt {
        text: sections.join("\n"),
        image: image.map(ContentPart::png),
    }
}

fn asset_line(quote: &AssetQuote) -> String {
    match quote.price {
        Some(price) => format!("- {}: current price ${}", quote.display_name, price),
        None => format!("- {}: current price unavailable", quote.display_name),
    }
}
