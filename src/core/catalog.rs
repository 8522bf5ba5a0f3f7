use crate::domain::model::CatalogItem;
use crate::utils::error::{AggregatorError, Result};
use serde_json::Value;

/// 上游專用、不對外輸出的欄位
const INTERNAL_ITEM_FIELDS: [&str; 2] = ["id", "trend"];

/// 品項篩選條件；`None` 代表不篩選該欄位
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub rarity: Option<String>,
    pub name: Option<String>,
}

impl CatalogFilter {
    /// Builds criteria from a query string. `filter` is accepted as an alias
    /// for `category` and wins when both are given; empty values are ignored.
    pub fn from_query_str(query: &str) -> Self {
        let mut filter = None;
        let mut category = None;
        let mut rarity = None;
        let mut name = None;

        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            if value.is_empty() {
                continue;
            }
            let slot = match &*key {
                "filter" => &mut filter,
                "category" => &mut category,
                "rarity" => &mut rarity,
                "name" => &mut name,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        Self {
            category: filter.or(category),
            rarity,
            name,
        }
    }

    pub fn new(category: Option<String>, rarity: Option<String>, name: Option<String>) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            category: non_empty(category),
            rarity: non_empty(rarity),
            name: non_empty(name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.rarity.is_none() && self.name.is_none()
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        let exact = |wanted: &Option<String>, actual: &Option<String>| match wanted {
            None => true,
            Some(w) => actual
                .as_deref()
                .is_some_and(|a| a.to_lowercase() == w.to_lowercase()),
        };

        let name_matches = match &self.name {
            None => true,
            Some(w) => item
                .name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&w.to_lowercase())),
        };

        exact(&self.category, &item.category) && exact(&self.rarity, &item.rarity) && name_matches
    }
}

/// 去掉 `pagination` 與每筆的 `id` / `trend`，其餘欄位原樣保留
pub fn normalize(response: Value) -> Result<Vec<CatalogItem>> {
    let Value::Object(mut body) = response else {
        return Err(AggregatorError::decode(
            "catalog response",
            "expected a JSON object at top level",
        ));
    };
    body.remove("pagination");

    let Some(Value::Array(records)) = body.remove("items") else {
        return Err(AggregatorError::DataUnavailable {
            message: "Item data not available".to_string(),
        });
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| normalize_record(index, record))
        .collect()
}

fn normalize_record(index: usize, record: Value) -> Result<CatalogItem> {
    let Value::Object(mut fields) = record else {
        return Err(AggregatorError::decode(
            format!("catalog item #{}", index),
            "expected a JSON object",
        ));
    };
    for field in INTERNAL_ITEM_FIELDS {
        fields.remove(field);
    }
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| AggregatorError::decode(format!("catalog item #{}", index), e))
}

pub fn filter(items: &[CatalogItem], criteria: &CatalogFilter) -> Vec<CatalogItem> {
    if criteria.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| criteria.matches(item))
        .cloned()
        .collect()
}
