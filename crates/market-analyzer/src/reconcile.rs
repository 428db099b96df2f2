//! Response Reconciler
//!
//! Turns the model's raw reply into a JSON document and overwrites
//! AI-reported prices with the fetched ones.
//!
//! Extraction is a heuristic: the candidate document runs from the first
//! `{` to the last `}` of the reply. Braces in surrounding commentary can
//! widen the slice and make an otherwise valid answer fail to parse.

use serde_json::Value;

use crate::error::{AnalysisError, Result};
use crate::model::AssetQuote;

/// Slice from the first `{` to the last `}`, inclusive.
///
/// A last `}` that precedes the first `{` yields an empty candidate, which
/// then fails to parse.
pub fn extract_json_object(raw: &str) -> Result<&str> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(AnalysisError::NoJsonFound);
    };

    if end < start {
        return Ok(&raw[start..start]);
    }
    Ok(&raw[start..=end])
}

/// Extract and parse the JSON document in a raw reply.
pub fn parse_reply(raw: &str) -> Result<Value> {
    let candidate = extract_json_object(raw).inspect_err(|_| {
        tracing::error!(raw_response = %raw, "Could not find a JSON object in AI response");
    })?;

    serde_json::from_str(candidate).map_err(|e| {
        tracing::error!(error = %e, raw_response = %raw, "Failed to parse JSON from AI response");
        AnalysisError::JsonParse(e)
    })
}

/// Overwrite `current_price` of every ranked asset whose name matches a
/// quote's display name, ignoring case. First matching quote wins; the
/// quote's price is written even when absent (`null`).
///
/// Returns the number of entries overwritten.
pub fn reconcile_prices(document: &mut Value, quotes: &[AssetQuote]) -> usize {
    let Some(ranked) = document.get_mut("ranked_assets") else {
        return 0;
    };
    let Some(entries) = ranked.as_array_mut() else {
        tracing::warn!("'ranked_assets' is not an array, leaving prices untouched");
        return 0;
    };

    let mut matched = 0;
    for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
        let name = entry
            .get("asset_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase();

        if let Some(quote) = quotes.iter().find(|q| q.display_name.to_lowercase() == name) {
            entry.insert("current_price".into(), quote.price_json());
            matched += 1;
        }
    }
    matched
}

/// Parse a raw reply and reconcile it against the fetched quotes.
pub fn reconcile(raw: &str, quotes: &[AssetQuote]) -> Result<Value> {
    let mut document = parse_reply(raw)?;
    let matched = reconcile_prices(&mut document, quotes);
    tracing::debug!(matched, quotes = quotes.len(), "Reconciled AI prices");
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_extracts_between_outer_braces() {
        let raw = r#"noise {"ranked_assets":[],"detailed_analysis":"x"} trailing"#;

        let candidate = extract_json_object(raw).unwrap();
        assert_eq!(candidate, r#"{"ranked_assets":[],"detailed_analysis":"x"}"#);

        let doc = parse_reply(raw).unwrap();
        assert_eq!(doc["detailed_analysis"], "x");
    }

    #[test]
    fn test_code_fences_are_skipped() {
        let raw = "```json\n{\"ranked_assets\": []}\n```";
        assert_eq!(parse_reply(raw).unwrap(), json!({"ranked_assets": []}));
    }

    #[test]
    fn test_missing_delimiters() {
        for raw in ["no json here", "only { opening", "only } closing", ""] {
            assert!(matches!(parse_reply(raw), Err(AnalysisError::NoJsonFound)), "{raw}");
        }
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_reply("{not valid json}"), Err(AnalysisError::JsonParse(_))));
        assert!(matches!(parse_reply("{\"a\": 1} and }"), Err(AnalysisError::JsonParse(_))));
    }

    #[test]
    fn test_unterminated_object_is_not_found() {
        // no closing brace at all
        assert!(matches!(parse_reply("{not valid json"), Err(AnalysisError::NoJsonFound)));
    }

    #[test]
    fn test_inverted_braces_fail_to_parse() {
        assert_eq!(extract_json_object("} then {").unwrap(), "");
        assert!(matches!(parse_reply("} then {"), Err(AnalysisError::JsonParse(_))));
    }

    #[test]
    fn test_reconcile_overwrites_matching_names() {
        let quotes = vec![AssetQuote::new("bitcoin", Some(dec!(65000)))];
        let mut doc = json!({
            "ranked_assets": [
                {"asset_name": "bitcoin", "current_price": null},
                {"asset_name": "Dogecoin", "current_price": null},
                {"asset_name": "Gold", "current_price": 2400.5}
            ]
        });

        assert_eq!(reconcile_prices(&mut doc, &quotes), 1);
        assert_eq!(doc["ranked_assets"][0]["current_price"], json!(65000));
        assert_eq!(doc["ranked_assets"][1]["current_price"], Value::Null);
        assert_eq!(doc["ranked_assets"][2]["current_price"], json!(2400.5));
    }

    #[test]
    fn test_reconcile_writes_absent_price() {
        let quotes = vec![AssetQuote::unpriced("ethereum")];
        let mut doc = json!({"ranked_assets": [{"asset_name": "ETHEREUM", "current_price": 3400}]});

        reconcile_prices(&mut doc, &quotes);
        assert_eq!(doc["ranked_assets"][0]["current_price"], Value::Null);
    }

    #[test]
    fn test_reconcile_first_quote_wins() {
        let quotes = vec![
            AssetQuote::new("bitcoin", Some(dec!(1))),
            AssetQuote::new("bitcoin", Some(dec!(2))),
        ];
        let mut doc = json!({"ranked_assets": [{"asset_name": "Bitcoin"}]});

        reconcile_prices(&mut doc, &quotes);
        assert_eq!(doc["ranked_assets"][0]["current_price"], json!(1));
    }

    #[test]
    fn test_reconcile_tolerates_odd_shapes() {
        let quotes = vec![AssetQuote::new("bitcoin", Some(dec!(1)))];

        let mut doc = json!({"detailed_analysis": "x"});
        assert_eq!(reconcile_prices(&mut doc, &quotes), 0);
        assert_eq!(doc, json!({"detailed_analysis": "x"}));

        let mut doc = json!({"ranked_assets": "Bitcoin"});
        assert_eq!(reconcile_prices(&mut doc, &quotes), 0);

        let mut doc = json!({"ranked_assets": ["Bitcoin", {"score": 3}]});
        assert_eq!(reconcile_prices(&mut doc, &quotes), 0);
        assert_eq!(doc, json!({"ranked_assets": ["Bitcoin", {"score": 3}]}));
    }

    #[test]
    fn test_reconcile_end_to_end() {
        let quotes = vec![AssetQuote::new("bitcoin", Some(dec!(50000)))];
        let raw = "Here is the analysis:\n{\"ranked_assets\": [{\"asset_name\": \"Bitcoin\", \"current_price\": 1, \"score\": 70}], \"detailed_analysis\": \"...\"}\nGood luck!";

        let doc = reconcile(raw, &quotes).unwrap();
        assert_eq!(doc["ranked_assets"][0]["current_price"], json!(50000));
        assert_eq!(doc["ranked_assets"][0]["score"], json!(70));
    }
}
