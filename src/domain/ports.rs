use crate::utils::error::Result;
use async_trait::async_trait;
use std::fmt;

/// 上游資料來源。名稱會出現在日誌與錯誤訊息中
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    Weather,
    Catalog,
    MainStock,
    SpecialStock,
}

impl DataSource {
    pub fn name(&self) -> &'static str {
        match self {
            DataSource::Weather => "weather",
            DataSource::Catalog => "catalog",
            DataSource::MainStock => "main-stock",
            DataSource::SpecialStock => "special-stock",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transport seam: "GET this URL for this source, give me the body".
///
/// Implementations must map non-success statuses and transport failures to
/// `AggregatorError::UpstreamFailed`.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn fetch_text(&self, source: DataSource, url: &str) -> Result<String>;
}
