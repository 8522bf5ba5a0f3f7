use crate::domain::model::{StockEntry, StockResponse};
use crate::utils::error::{AggregatorError, Result};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static COUNT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\*\*x(\d+)\*\*$").expect("count suffix pattern is valid"));

/// `/api/stock` 的回應
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainStockPayload {
    #[serde(default)]
    pub gear: Vec<String>,
    #[serde(default)]
    pub seeds: Vec<String>,
    #[serde(default)]
    pub egg: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// `/api/special-stock` 的回應
#[derive(Debug, Default, Deserialize)]
pub struct SpecialStockPayload {
    #[serde(default)]
    pub honey: Vec<String>,
    #[serde(default)]
    pub cosmetics: Vec<String>,
}

pub fn parse_line(line: &str) -> StockEntry {
    let line = line.trim_end();
    match COUNT_SUFFIX.captures(line) {
        Some(caps) => {
            let suffix_start = caps.get(0).map_or(line.len(), |m| m.start());
            StockEntry {
                name: line[..suffix_start].trim().to_string(),
                count: caps[1].to_string(),
            }
        }
        None => StockEntry {
            name: line.trim().to_string(),
            count: "0".to_string(),
        },
    }
}

/// 依輸入順序逐行解析，不排序也不去重
pub fn parse<S: AsRef<str>>(lines: &[S]) -> Vec<StockEntry> {
    lines.iter().map(|line| parse_line(line.as_ref())).collect()
}

pub fn decode_main(body: &str) -> Result<MainStockPayload> {
    serde_json::from_str(body).map_err(|e| AggregatorError::decode("main stock response", e))
}

pub fn decode_special(body: &str) -> Result<SpecialStockPayload> {
    serde_json::from_str(body).map_err(|e| AggregatorError::decode("special stock response", e))
}

/// `now_millis` 只在上游沒有給 `updatedAt`（或給 0）時使用
pub fn assemble(
    main: &MainStockPayload,
    special: &SpecialStockPayload,
    now_millis: i64,
) -> StockResponse {
    StockResponse {
        updated_at: main.updated_at.filter(|t| *t != 0).unwrap_or(now_millis),
        gear: parse(&main.gear),
        seeds: parse(&main.seeds),
        egg: parse(&main.egg),
        honey: parse(&special.honey),
        cosmetics: parse(&special.cosmetics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, count: &str) -> StockEntry {
        StockEntry {
            name: name.to_string(),
            count: count.to_string(),
        }
    }

    #[test]
    fn test_parse_counts_and_defaults() {
        assert_eq!(
            parse(&["Apple **x3**", "Banana"]),
            vec![entry("Apple", "3"), entry("Banana", "0")]
        );
    }

    #[test]
    fn test_parse_trims_and_only_matches_trailing_suffix() {
        assert_eq!(parse_line("  Watering Can   **x12**  "), entry("Watering Can", "12"));
        assert_eq!(parse_line("Odd **x2** Name"), entry("Odd **x2** Name", "0"));
        assert_eq!(parse_line("Sprinkler**x1**"), entry("Sprinkler", "1"));
        assert_eq!(parse_line("Broken **x**"), entry("Broken **x**", "0"));
    }

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        let parsed = parse(&["b **x1**", "a **x2**", "b **x1**"]);
        assert_eq!(
            parsed,
            vec![entry("b", "1"), entry("a", "2"), entry("b", "1")]
        );
    }

    #[test]
    fn test_assemble_uses_upstream_timestamp_when_present() {
        let main = decode_main(
            r#"{"gear":["Trowel **x2**"],"seeds":["Carrot **x10**","Corn"],"updatedAt":1718000000000}"#,
        )
        .unwrap();
        let special = decode_special(r#"{"honey":["Honey Comb **x1**"]}"#).unwrap();

        let stock = assemble(&main, &special, 42);
        assert_eq!(stock.updated_at, 1718000000000);
        assert_eq!(stock.gear, vec![entry("Trowel", "2")]);
        assert_eq!(stock.seeds, vec![entry("Carrot", "10"), entry("Corn", "0")]);
        assert!(stock.egg.is_empty());
        assert_eq!(stock.honey, vec![entry("Honey Comb", "1")]);
        assert!(stock.cosmetics.is_empty());
    }

    #[test]
    fn test_assemble_falls_back_to_now() {
        let main = decode_main(r#"{"updatedAt":0}"#).unwrap();
        let stock = assemble(&main, &SpecialStockPayload::default(), 99);
        assert_eq!(stock.updated_at, 99);

        let main = decode_main("{}").unwrap();
        assert_eq!(assemble(&main, &SpecialStockPayload::default(), 7).updated_at, 7);
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let err = decode_main("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, AggregatorError::DecodeFailed { .. }));
    }
}
