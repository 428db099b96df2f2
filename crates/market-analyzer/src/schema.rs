//! Schema Audit
//!
//! Checks a reconciled document against the typed model and reports what
//! doesn't fit. The audit never mutates or rejects the document: callers
//! log the findings and return the model's answer as is.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::model::{AnalysisResult, PatternMatch, RankedAsset, TimeframeSignal};

/// Number of timeframe buckets the prompt asks for
pub const EXPECTED_TIMEFRAMES: usize = 3;

/// One finding, addressed by a JSON-pointer-like path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaWarning {
    pub path: String,
    pub message: String,
}

impl SchemaWarning {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of an audit
#[derive(Clone, Debug, Default)]
pub struct AuditReport {
    pub warnings: Vec<SchemaWarning>,

    /// Typed view, present only when the whole document deserializes
    pub result: Option<AnalysisResult>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Audit a reconciled document.
pub fn audit(document: &Value) -> AuditReport {
    let mut warnings = Vec::new();

    if !document.is_object() {
        warnings.push(SchemaWarning::new("/", "document is not a JSON object"));
        return AuditReport { warnings, result: None };
    }

    let ranked: Vec<(usize, RankedAsset)> = audit_array(document, "ranked_assets", &mut warnings);
    for (i, asset) in &ranked {
        check_percent(&format!("/ranked_assets/{i}/score"), asset.score, &mut warnings);
    }
    if ranked.windows(2).any(|w| w[0].1.score < w[1].1.score) {
        warnings.push(SchemaWarning::new(
            "/ranked_assets",
            "entries are not sorted by descending score",
        ));
    }

    match document.get("detailed_analysis") {
        Some(Value::String(_)) => {}
        Some(_) => warnings.push(SchemaWarning::new("/detailed_analysis", "not a string")),
        None => warnings.push(SchemaWarning::new("/detailed_analysis", "missing")),
    }

    let timeframes: Vec<(usize, TimeframeSignal)> =
        audit_array(document, "multi_timeframe_analysis", &mut warnings);
    if document.get("multi_timeframe_analysis").is_some() && timeframes.len() != EXPECTED_TIMEFRAMES {
        warnings.push(SchemaWarning::new(
            "/multi_timeframe_analysis",
            format!("expected {EXPECTED_TIMEFRAMES} valid timeframes, found {}", timeframes.len()),
        ));
    }

    let patterns: Vec<(usize, PatternMatch)> = audit_array(document, "pattern_recognition", &mut warnings);
    for (i, pattern) in &patterns {
        check_percent(&format!("/pattern_recognition/{i}/confidence"), pattern.confidence, &mut warnings);
    }

    let result = serde_json::from_value::<AnalysisResult>(document.clone()).ok();
    AuditReport { warnings, result }
}

/// Deserialize every entry of `document[key]` on its own, recording a
/// warning for each one that doesn't fit `T`. Valid entries keep their
/// array index.
fn audit_array<T: DeserializeOwned>(document: &Value, key: &str, warnings: &mut Vec<SchemaWarning>) -> Vec<(usize, T)> {
    let path = format!("/{key}");
    match document.get(key) {
        None => {
            warnings.push(SchemaWarning::new(path, "missing"));
            Vec::new()
        }
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                serde_json::from_value::<T>(entry.clone())
                    .inspect_err(|e| warnings.push(SchemaWarning::new(format!("{path}/{i}"), e.to_string())))
                    .ok()
                    .map(|parsed| (i, parsed))
            })
            .collect(),
        Some(_) => {
            warnings.push(SchemaWarning::new(path, "not an array"));
            Vec::new()
        }
    }
}

fn check_percent(path: &str, value: f64, warnings: &mut Vec<SchemaWarning>) {
    if !(0.0..=100.0).contains(&value) {
        warnings.push(SchemaWarning::new(path, format!("{value} is outside 0-100")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::OUTPUT_EXAMPLE;
    use serde_json::json;

    #[test]
    fn test_example_is_clean() {
        let document: Value = serde_json::from_str(OUTPUT_EXAMPLE).unwrap();
        let report = audit(&document);

        assert!(report.is_clean(), "{:?}", report.warnings);
        assert!(report.result.is_some());
    }

    #[test]
    fn test_flags_without_mutating() {
        let document = json!({
            "ranked_assets": [
                {"asset_name": "Bitcoin", "current_price": 1, "score": 40, "strategy": "BUY", "holding_period": "1h", "reason": "r"},
                {"asset_name": "Gold", "current_price": null, "score": 140, "strategy": "ACCUMULATE", "holding_period": "1w", "reason": "r"},
                {"asset_name": "Solana", "current_price": 2, "score": 120, "strategy": "HOLD", "holding_period": "1d", "reason": "r"}
            ],
            "detailed_analysis": "x",
            "multi_timeframe_analysis": [
                {"timeframe": "Scalping (1-5 minutes)", "signal": "BUY", "risk": "tinggi", "reason": "r"}
            ],
            "pattern_recognition": []
        });
        let before = document.clone();

        let report = audit(&document);
        let paths: Vec<&str> = report.warnings.iter().map(|w| w.path.as_str()).collect();

        assert!(paths.contains(&"/ranked_assets/1"), "{paths:?}");
        assert!(paths.contains(&"/ranked_assets/2/score"));
        assert!(paths.contains(&"/ranked_assets"));
        assert!(paths.contains(&"/multi_timeframe_analysis/0"));
        assert!(paths.contains(&"/multi_timeframe_analysis"));
        assert!(report.result.is_none());
        assert_eq!(document, before);
    }

    #[test]
    fn test_missing_keys() {
        let report = audit(&json!({"ranked_assets": []}));
        let paths: Vec<&str> = report.warnings.iter().map(|w| w.path.as_str()).collect();

        assert_eq!(
            paths,
            vec!["/detailed_analysis", "/multi_timeframe_analysis", "/pattern_recognition"]
        );
    }

    #[test]
    fn test_pattern_confidence_range() {
        let document = json!({
            "ranked_assets": [],
            "detailed_analysis": "x",
            "multi_timeframe_analysis": [
                {"timeframe": "a", "signal": "HOLD", "risk": "LOW", "reason": "r"},
                {"timeframe": "b", "signal": "NEUTRAL", "risk": "MEDIUM", "reason": "r"},
                {"timeframe": "c", "signal": "SELL", "risk": "HIGH", "reason": "r"}
            ],
            "pattern_recognition": [{"pattern": "Triangle", "confidence": -5, "description": "d"}]
        });

        let report = audit(&document);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "/pattern_recognition/0/confidence");
        assert!(report.result.is_some());
    }

    #[test]
    fn test_non_object() {
        let report = audit(&json!([1, 2]));
        assert_eq!(report.warnings[0].to_string(), "/: document is not a JSON object");
    }
}
