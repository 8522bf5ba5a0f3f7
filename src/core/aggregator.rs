use crate::config::toml_config::AggregatorConfig;
use crate::core::cache::SnapshotCache;
use crate::core::catalog::{self, CatalogFilter};
use crate::core::extractor;
use crate::core::stock;
use crate::domain::model::{CatalogItem, StockResponse};
use crate::domain::ports::{DataSource, Upstream};
use crate::utils::error::{AggregatorError, Result};
use serde_json::Value;
use std::sync::Arc;

pub const WEATHER_KEY: &str = "weatherDataSSR";

#[derive(Debug, Clone)]
struct SourceUrls {
    weather: String,
    catalog: String,
    main_stock: String,
    special_stock: String,
}

/// Serves weather, catalog and stock data, one snapshot cache per source.
///
/// Built once at startup and shared for the life of the process.
pub struct Aggregator<U: Upstream> {
    upstream: U,
    urls: SourceUrls,
    weather: SnapshotCache<Value>,
    catalog: SnapshotCache<Vec<CatalogItem>>,
    stock: SnapshotCache<StockResponse>,
}

impl<U: Upstream> Aggregator<U> {
    pub fn new(upstream: U, config: &AggregatorConfig) -> Self {
        let urls = SourceUrls {
            weather: config.upstream.weather_url.clone(),
            catalog: config.upstream.catalog_url.clone(),
            main_stock: config.upstream.main_stock_url.clone(),
            special_stock: config.upstream.special_stock_url.clone(),
        };

        tracing::debug!(
            "Snapshot TTLs: weather={:?} catalog={:?} stock={:?}",
            config.cache.weather_ttl(),
            config.cache.catalog_ttl(),
            config.cache.stock_ttl()
        );

        Self {
            upstream,
            urls,
            weather: SnapshotCache::new("Weather", config.cache.weather_ttl()),
            catalog: SnapshotCache::new("Item-Info", config.cache.catalog_ttl()),
            stock: SnapshotCache::new("Stock", config.cache.stock_ttl()),
        }
    }

    pub async fn weather(&self) -> Result<Arc<Value>> {
        self.weather.get_or_refresh(|| self.fetch_weather()).await
    }

    /// 過濾每次都對快取中的完整目錄重新做，結果本身不快取
    pub async fn catalog(&self, criteria: &CatalogFilter) -> Result<Vec<CatalogItem>> {
        let items = self.catalog.get_or_refresh(|| self.fetch_catalog()).await?;
        let filtered = catalog::filter(&items, criteria);
        tracing::debug!("Catalog filter {:?} matched {} of {} items", criteria, filtered.len(), items.len());
        Ok(filtered)
    }

    pub async fn catalog_from_query(&self, query: &str) -> Result<Vec<CatalogItem>> {
        self.catalog(&CatalogFilter::from_query_str(query)).await
    }

    pub async fn stock(&self) -> Result<Arc<StockResponse>> {
        self.stock.get_or_refresh(|| self.fetch_stock()).await
    }

    async fn fetch_weather(&self) -> Result<Value> {
        let text = self
            .upstream
            .fetch_text(DataSource::Weather, &self.urls.weather)
            .await?;

        let object = extractor::extract(&text, WEATHER_KEY).map_err(|reason| {
            tracing::error!(
                "Failed to fetch weather data: '{}' {} ({} bytes of page)",
                WEATHER_KEY,
                reason,
                text.len()
            );
            AggregatorError::ExtractionFailed {
                key: WEATHER_KEY.to_string(),
                reason,
            }
        })?;

        serde_json::from_str(object).map_err(|e| {
            tracing::error!("Failed to parse extracted {} JSON: {}", WEATHER_KEY, e);
            AggregatorError::decode(format!("extracted {}", WEATHER_KEY), e)
        })
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>> {
        let body = self
            .upstream
            .fetch_text(DataSource::Catalog, &self.urls.catalog)
            .await?;

        let response: Value = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("[Item-Info] Catalog response is not JSON: {}", e);
            AggregatorError::decode("catalog response", e)
        })?;

        let items = catalog::normalize(response).inspect_err(|e| {
            tracing::error!("[Item-Info] Normalizing catalog failed: {}", e);
        })?;
        tracing::info!("[Item-Info] Database updated with {} items", items.len());
        Ok(items)
    }

    async fn fetch_stock(&self) -> Result<StockResponse> {
        // 兩個來源同時抓，兩邊都結束後才組合
        let (main, special) = tokio::join!(
            self.upstream
                .fetch_text(DataSource::MainStock, &self.urls.main_stock),
            self.upstream
                .fetch_text(DataSource::SpecialStock, &self.urls.special_stock),
        );

        let main = stock::decode_main(&main?).inspect_err(|e| {
            tracing::error!("Failed to fetch stock data: {}", e);
        })?;
        let special = stock::decode_special(&special?).inspect_err(|e| {
            tracing::error!("Failed to fetch special stock data: {}", e);
        })?;

        Ok(stock::assemble(
            &main,
            &special,
            chrono::Utc::now().timestamp_millis(),
        ))
    }
}
