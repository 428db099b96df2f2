//! Server Configuration
//!
//! Everything is read once at startup from the environment (a `.env` file
//! is loaded first when present).

use analyst_runtime::GeminiConfig;
use market_analyzer::CoinGeckoConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Request body cap. Gemini accepts up to 20 MB of inline data per request,
/// and base64 chart uploads travel inside the JSON body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Listener, static asset and request size settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub static_dir: String,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            static_dir: DEFAULT_STATIC_DIR.into(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let max_body_bytes = match non_empty("MAX_BODY_BYTES").map(|v| v.parse::<usize>()) {
            Some(Ok(bytes)) => bytes,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Ignoring invalid MAX_BODY_BYTES, using {}", defaults.max_body_bytes);
                defaults.max_body_bytes
            }
            None => defaults.max_body_bytes,
        };

        Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            static_dir: non_empty("STATIC_DIR").unwrap_or(defaults.static_dir),
            max_body_bytes,
        }
    }
}

/// Full process configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub coingecko: CoinGeckoConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Fails only when the AI credential is missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            server: ServerConfig::from_lookup(&lookup),
            gemini: GeminiConfig::from_lookup(&lookup)?,
            coingecko: CoinGeckoConfig::from_lookup(&lookup),
        })
    }
}
