use crate::utils::error::{AggregatorError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_WEATHER_URL: &str = "https://growagarden.gg/weather?_rsc=2pcbz";
pub const DEFAULT_CATALOG_URL: &str =
    "https://growagarden.gg/api/v1/items/Gag/all?page=1&limit=1000000&sortBy=position";
pub const DEFAULT_MAIN_STOCK_URL: &str = "https://growagardenstock.com/api/stock";
pub const DEFAULT_SPECIAL_STOCK_URL: &str = "https://growagardenstock.com/api/special-stock";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36 OPR/119.0.0.0";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatorConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub weather_url: String,
    pub catalog_url: String,
    pub main_stock_url: String,
    pub special_stock_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            main_stock_url: DEFAULT_MAIN_STOCK_URL.to_string(),
            special_stock_url: DEFAULT_SPECIAL_STOCK_URL.to_string(),
            timeout_seconds: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// 各來源快照的存活時間（秒），0 代表每次都即時抓取
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub weather_ttl_seconds: u64,
    pub catalog_ttl_seconds: u64,
    pub stock_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            weather_ttl_seconds: 30,
            catalog_ttl_seconds: 300,
            stock_ttl_seconds: 30,
        }
    }
}

impl CacheConfig {
    pub fn weather_ttl(&self) -> Duration {
        Duration::from_secs(self.weather_ttl_seconds)
    }

    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_seconds)
    }

    pub fn stock_ttl(&self) -> Duration {
        Duration::from_secs(self.stock_ttl_seconds)
    }
}

impl AggregatorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AggregatorError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOG_URL})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| AggregatorError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for AggregatorConfig {
    fn validate(&self) -> Result<()> {
        let upstream = &self.upstream;
        validation::validate_url("upstream.weather_url", &upstream.weather_url)?;
        validation::validate_url("upstream.catalog_url", &upstream.catalog_url)?;
        validation::validate_url("upstream.main_stock_url", &upstream.main_stock_url)?;
        validation::validate_url("upstream.special_stock_url", &upstream.special_stock_url)?;
        validation::validate_range("upstream.timeout_seconds", upstream.timeout_seconds, 1, 300)?;
        validation::validate_non_empty_string("upstream.user_agent", &upstream.user_agent)?;

        // 一天以上的快照已經沒有意義
        let day = 24 * 60 * 60;
        validation::validate_range("cache.weather_ttl_seconds", self.cache.weather_ttl_seconds, 0, day)?;
        validation::validate_range("cache.catalog_ttl_seconds", self.cache.catalog_ttl_seconds, 0, day)?;
        validation::validate_range("cache.stock_ttl_seconds", self.cache.stock_ttl_seconds, 0, day)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AggregatorConfig::from_toml_str("").unwrap();
        assert_eq!(config.upstream.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.upstream.timeout(), Duration::from_secs(10));
        assert_eq!(config.cache.catalog_ttl(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
[upstream]
catalog_url = "https://mirror.example.com/items"
timeout_seconds = 3

[cache]
stock_ttl_seconds = 0
"#;

        let config = AggregatorConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.upstream.catalog_url, "https://mirror.example.com/items");
        assert_eq!(config.upstream.weather_url, DEFAULT_WEATHER_URL);
        assert_eq!(config.upstream.timeout_seconds, 3);
        assert_eq!(config.cache.stock_ttl(), Duration::ZERO);
        assert_eq!(config.cache.weather_ttl_seconds, 30);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("GARDEN_TEST_STOCK_HOST", "https://stock.test");

        let toml_content = r#"
[upstream]
main_stock_url = "${GARDEN_TEST_STOCK_HOST}/api/stock"
special_stock_url = "${GARDEN_TEST_UNSET_VAR}/special"
"#;

        let config = AggregatorConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.upstream.main_stock_url, "https://stock.test/api/stock");
        assert_eq!(config.upstream.special_stock_url, "${GARDEN_TEST_UNSET_VAR}/special");
        assert!(config.validate().is_err());

        std::env::remove_var("GARDEN_TEST_STOCK_HOST");
    }

    #[test]
    fn test_config_validation() {
        let config = AggregatorConfig::from_toml_str(
            r#"
[upstream]
timeout_seconds = 0
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(AggregatorError::InvalidConfigValueError { .. })
        ));

        let err = AggregatorConfig::from_toml_str("[cache]\ncatalog_ttl_seconds = \"five\"").unwrap_err();
        assert!(matches!(err, AggregatorError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[cache]\ncatalog_ttl_seconds = 60\n")
            .unwrap();

        let config = AggregatorConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.cache.catalog_ttl_seconds, 60);

        assert!(AggregatorConfig::from_file("/nonexistent/garden.toml").is_err());
    }
}
