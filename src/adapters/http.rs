use crate::config::toml_config::UpstreamConfig;
use crate::domain::ports::{DataSource, Upstream};
use crate::utils::error::{AggregatorError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client;

const WEATHER_ROUTER_STATE: &str = "%5B%22%22%2C%7B%22children%22%3A%5B%22stocks%22%2C%7B%22children%22%3A%5B%22__PAGE__%22%2C%7B%7D%2C%22%2Fstocks%22%2C%22refresh%22%5D%7D%5D%7D%2Cnull%2C%22refetch%22%5D";

/// reqwest 實作的上游連線。逾時由 client 統一設定，
/// 呼叫端丟棄 future 時請求也會一併取消
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AggregatorError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    fn headers_for(source: DataSource) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        match source {
            DataSource::Weather => {
                headers.insert(REFERER, HeaderValue::from_static("https://growagarden.gg/weather"));
                headers.insert(HeaderName::from_static("rsc"), HeaderValue::from_static("1"));
                headers.insert(
                    HeaderName::from_static("next-router-state-tree"),
                    HeaderValue::from_static(WEATHER_ROUTER_STATE),
                );
                headers.insert(HeaderName::from_static("sec-fetch-dest"), HeaderValue::from_static("empty"));
                headers.insert(HeaderName::from_static("sec-fetch-mode"), HeaderValue::from_static("cors"));
                headers.insert(
                    HeaderName::from_static("sec-fetch-site"),
                    HeaderValue::from_static("same-origin"),
                );
            }
            DataSource::Catalog => {
                headers.insert(REFERER, HeaderValue::from_static("https://growagarden.gg/values"));
            }
            DataSource::MainStock | DataSource::SpecialStock => {
                headers.insert(
                    REFERER,
                    HeaderValue::from_static("https://growagardenstock.com/api/stock"),
                );
            }
        }

        headers
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch_text(&self, source: DataSource, url: &str) -> Result<String> {
        tracing::debug!("Making {} request to: {}", source, url);

        let response = self
            .client
            .get(url)
            .headers(Self::headers_for(source))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("{} request to {} failed: {}", source, url, e);
                AggregatorError::UpstreamFailed {
                    source_name: source.name().to_string(),
                    status: None,
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        tracing::debug!("{} response status: {}", source, status);

        if !status.is_success() {
            tracing::error!("{} upstream returned HTTP {} for {}", source, status.as_u16(), url);
            return Err(AggregatorError::UpstreamFailed {
                source_name: source.name().to_string(),
                status: Some(status.as_u16()),
                message: format!("HTTP error! status: {}", status.as_u16()),
            });
        }

        response.text().await.map_err(|e| {
            tracing::error!("Reading {} response body failed: {}", source, e);
            AggregatorError::UpstreamFailed {
                source_name: source.name().to_string(),
                status: Some(status.as_u16()),
                message: e.to_string(),
            }
        })
    }
}
