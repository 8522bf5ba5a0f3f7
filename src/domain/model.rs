use serde::{Deserialize, Serialize};

/// 一筆庫存：`"Carrot **x3**"` 解析後的結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub name: String,
    pub count: String,
}

/// 合併主庫存與特殊庫存後對外輸出的結構
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockResponse {
    pub updated_at: i64,
    pub gear: Vec<StockEntry>,
    pub seeds: Vec<StockEntry>,
    pub egg: Vec<StockEntry>,
    pub honey: Vec<StockEntry>,
    pub cosmetics: Vec<StockEntry>,
}

/// 目錄中的單一品項。上游的其他欄位原樣保留在 `extra`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
