//! Input validation for the fruit value calculator.
//!
//! The formula itself lives elsewhere behind [`FruitValuator`]; this module only
//! turns `Name=..&Weight=..&Variant=..&Mutation=a,b` into a typed request and
//! hands it over.

use crate::utils::error::{AggregatorError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_VARIANT: &str = "Normal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedValue<T> {
    pub value: T,
}

/// 傳給估價元件的輸入，欄位名稱沿用估價元件的格式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationInput {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Weight")]
    pub weight: WrappedValue<f64>,
    #[serde(rename = "Variant")]
    pub variant: WrappedValue<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRequest {
    pub name: String,
    pub weight: f64,
    pub variant: String,
    pub attributes: Vec<String>,
}

impl ValuationRequest {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            variant: DEFAULT_VARIANT.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn from_query_str(query: &str) -> Result<Self> {
        let mut name = None;
        let mut weight = None;
        let mut variant = None;
        let mut mutation = None;

        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let slot = match &*key {
                "Name" => &mut name,
                "Weight" => &mut weight,
                "Variant" => &mut variant,
                "Mutation" => &mut mutation,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        let (Some(name), Some(weight)) = (
            name.filter(|n: &String| !n.trim().is_empty()),
            weight.filter(|w: &String| !w.trim().is_empty()),
        ) else {
            return Err(AggregatorError::invalid_request(
                "Missing required parameters: Name, Weight",
            ));
        };

        let weight = parse_weight(&weight)?;

        Ok(Self {
            name,
            weight,
            variant: variant
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_VARIANT.to_string()),
            attributes: mutation.as_deref().map(split_attributes).unwrap_or_default(),
        })
    }

    pub fn to_input(&self) -> ValuationInput {
        ValuationInput {
            name: self.name.clone(),
            weight: WrappedValue { value: self.weight },
            variant: WrappedValue {
                value: self.variant.clone(),
            },
            attributes: self.attributes.clone(),
        }
    }
}

fn parse_weight(raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(w) if w.is_finite() => Ok(w),
        _ => Err(AggregatorError::invalid_request("Weight must be a valid number")),
    }
}

fn split_attributes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// 估價公式的介面，實作不在本 crate
pub trait FruitValuator: Send + Sync {
    fn value(&self, input: &ValuationInput) -> Result<f64>;
}

impl<F> FruitValuator for F
where
    F: Fn(&ValuationInput) -> Result<f64> + Send + Sync,
{
    fn value(&self, input: &ValuationInput) -> Result<f64> {
        self(input)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub value: f64,
}

pub fn quote_price<V: FruitValuator + ?Sized>(valuator: &V, query: &str) -> Result<PriceQuote> {
    let request = ValuationRequest::from_query_str(query)?;
    let input = request.to_input();
    tracing::debug!("Valuating {} ({} kg, {})", input.name, input.weight.value, input.variant.value);

    let value = valuator.value(&input).map_err(|e| {
        tracing::error!("Error calculating fruit value for {}: {}", input.name, e);
        e
    })?;
    Ok(PriceQuote { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_query_builds_valuator_input() {
        let request =
            ValuationRequest::from_query_str("Name=Apple&Weight=2.5&Variant=Golden&Mutation=Frozen,Wet")
                .unwrap();

        assert_eq!(
            serde_json::to_value(request.to_input()).unwrap(),
            json!({
                "Name": "Apple",
                "Weight": {"value": 2.5},
                "Variant": {"value": "Golden"},
                "attributes": ["Frozen", "Wet"]
            })
        );
    }

    #[test]
    fn test_missing_weight_is_invalid_request() {
        let err = ValuationRequest::from_query_str("Name=Apple&Variant=Golden&Mutation=Frozen,Wet")
            .unwrap_err();
        assert!(matches!(err, AggregatorError::InvalidRequest { .. }));
        assert_eq!(err.status_code(), 400);

        let err = ValuationRequest::from_query_str("Weight=2.5").unwrap_err();
        assert!(matches!(err, AggregatorError::InvalidRequest { .. }));
    }

    #[test]
    fn test_non_numeric_weight_is_invalid_request() {
        for weight in ["heavy", "NaN", "inf"] {
            let err = ValuationRequest::from_query_str(&format!("Name=Apple&Weight={}", weight))
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid request: Weight must be a valid number"
            );
        }
    }

    #[test]
    fn test_defaults_for_variant_and_attributes() {
        let request = ValuationRequest::from_query_str("Name=Carrot&Weight=0.3").unwrap();
        assert_eq!(request, ValuationRequest::new("Carrot", 0.3));

        let request =
            ValuationRequest::from_query_str("Name=Carrot&Weight=1&Mutation=%20Wet%20,,Shocked,")
                .unwrap();
        assert_eq!(request.attributes, vec!["Wet", "Shocked"]);
    }

    #[test]
    fn test_quote_price_propagates_result_and_failure() {
        let doubled = |input: &ValuationInput| -> Result<f64> { Ok(input.weight.value * 2.0) };
        let quote = quote_price(&doubled, "Name=Apple&Weight=2.5").unwrap();
        assert_eq!(quote, PriceQuote { value: 5.0 });

        let failing = |_: &ValuationInput| -> Result<f64> {
            Err(AggregatorError::DataUnavailable {
                message: "no base price for Apple".to_string(),
            })
        };
        let err = quote_price(&failing, "Name=Apple&Weight=2.5").unwrap_err();
        assert!(matches!(err, AggregatorError::DataUnavailable { .. }));

        let err = quote_price(&doubled, "Name=Apple").unwrap_err();
        assert!(err.is_client_error());
    }
}
