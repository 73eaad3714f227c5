use crate::utils::error::{DashboardError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 可選的 TOML 配置檔，所有欄位都可被命令列或環境變數覆蓋
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: Option<ServerSection>,
    pub database: Option<DatabaseSection>,
    pub dataset: Option<DatasetSection>,
    pub analytics: Option<AnalyticsSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetSection {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsSection {
    pub anchor_start_year: Option<i32>,
    pub anchor_end_year: Option<i32>,
    pub sub_call_timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DashboardError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DashboardError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATABASE_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashboardError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn port(&self) -> Option<u16> {
        self.server.as_ref().and_then(|s| s.port)
    }

    pub fn host(&self) -> Option<&str> {
        self.server.as_ref().and_then(|s| s.host.as_deref())
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database.as_ref().and_then(|d| d.url.as_deref())
    }

    pub fn dataset_url(&self) -> Option<&str> {
        self.dataset.as_ref().and_then(|d| d.url.as_deref())
    }

    pub fn anchor_years(&self) -> (Option<i32>, Option<i32>) {
        self.analytics
            .as_ref()
            .map(|a| (a.anchor_start_year, a.anchor_end_year))
            .unwrap_or((None, None))
    }

    pub fn sub_call_timeout_secs(&self) -> Option<u64> {
        self.analytics.as_ref().and_then(|a| a.sub_call_timeout_secs)
    }
}
