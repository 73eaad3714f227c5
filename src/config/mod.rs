pub mod toml_config;

use crate::core::month_range::{AnchorWindow, DEFAULT_END_YEAR, DEFAULT_START_YEAR};
use crate::core::reseed::DEFAULT_DATASET_URL;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_required_field,
    validate_url, Validate,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_SUB_CALL_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "HTTP analytics service over product sale records")]
pub struct CliConfig {
    #[arg(long, env = "PORT", help = "Port to listen on (required)")]
    pub port: Option<u16>,

    #[arg(long, env = "HOST", help = "Address to bind [default: 0.0.0.0]")]
    pub host: Option<String>,

    #[arg(
        long,
        env = "DATABASE_URL",
        help = "Record store: sqlite://<path>, sqlite::memory: or memory:// (required)"
    )]
    pub database_url: Option<String>,

    #[arg(long, env = "DATASET_URL", help = "Source of the seed dataset")]
    pub dataset_url: Option<String>,

    #[arg(long, env = "SUB_CALL_TIMEOUT_SECS", help = "Per sub-query timeout for combined data")]
    pub sub_call_timeout_secs: Option<u64>,

    #[arg(long, env = "DASHBOARD_CONFIG", help = "Optional TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

/// 載入 `.env` 到程序環境變數；已存在的變數不會被覆寫。
/// 未指定路徑時從工作目錄往上尋找，找不到檔案回傳 `Ok(None)`。
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(DashboardError::ConfigError {
            message: format!("Failed to load .env file: {}", e),
        }),
    }
}

/// 啟動時建立一次的應用配置
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub dataset_url: String,
    pub sub_call_timeout: Duration,
    pub anchor_start_year: i32,
    pub anchor_end_year: i32,
}

impl AppConfig {
    /// 載入 `--config` 指定的 TOML 檔（若有）並與命令列合併
    pub fn load(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                tracing::debug!("Loading configuration file {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        Self::merge(cli, &file)
    }

    /// 命令列/環境變數優先於配置檔
    pub fn merge(cli: &CliConfig, file: &TomlConfig) -> Result<Self> {
        let port = cli.port.or(file.port());
        let database_url = cli
            .database_url
            .clone()
            .or_else(|| file.database_url().map(String::from));
        let (file_start, file_end) = file.anchor_years();

        let config = Self {
            host: cli
                .host
                .clone()
                .or_else(|| file.host().map(String::from))
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: *validate_required_field("port", &port)?,
            database_url: validate_required_field("database_url", &database_url)?.clone(),
            dataset_url: cli
                .dataset_url
                .clone()
                .or_else(|| file.dataset_url().map(String::from))
                .unwrap_or_else(|| DEFAULT_DATASET_URL.to_string()),
            sub_call_timeout: Duration::from_secs(
                cli.sub_call_timeout_secs
                    .or(file.sub_call_timeout_secs())
                    .unwrap_or(DEFAULT_SUB_CALL_TIMEOUT_SECS),
            ),
            anchor_start_year: file_start.unwrap_or(DEFAULT_START_YEAR),
            anchor_end_year: file_end.unwrap_or(DEFAULT_END_YEAR),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn anchor_window(&self) -> Result<AnchorWindow> {
        AnchorWindow::new(self.anchor_start_year, self.anchor_end_year)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("host", &self.host)?;
        validate_non_empty_string("database_url", &self.database_url)?;
        validate_url("dataset_url", &self.dataset_url)?;
        validate_positive_number("sub_call_timeout_secs", self.sub_call_timeout.as_secs(), 1)?;
        validate_range("analytics.anchor_start_year", self.anchor_start_year, 1970, 9999)?;
        validate_range("analytics.anchor_end_year", self.anchor_end_year, 1970, 9999)?;
        self.anchor_window()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::{AnalyticsSection, DatabaseSection, ServerSection};
    use tempfile::TempDir;

    fn cli(port: Option<u16>, database_url: Option<&str>) -> CliConfig {
        CliConfig {
            port,
            database_url: database_url.map(String::from),
            ..CliConfig::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::merge(&cli(Some(5000), Some("memory://")), &TomlConfig::default()).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.dataset_url, DEFAULT_DATASET_URL);
        assert_eq!(config.sub_call_timeout, Duration::from_secs(10));
        assert_eq!(config.anchor_start_year, 2020);
        assert_eq!(config.anchor_end_year, 2025);
    }

    #[test]
    fn test_missing_port_fails() {
        let err = AppConfig::merge(&cli(None, Some("memory://")), &TomlConfig::default()).unwrap_err();
        assert!(matches!(err, DashboardError::MissingConfigError { ref field } if field == "port"));
    }

    #[test]
    fn test_missing_database_url_fails() {
        let err = AppConfig::merge(&cli(Some(5000), None), &TomlConfig::default()).unwrap_err();
        assert!(
            matches!(err, DashboardError::MissingConfigError { ref field } if field == "database_url")
        );
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = TomlConfig {
            server: Some(ServerSection {
                host: Some("127.0.0.1".to_string()),
                port: Some(7000),
            }),
            database: Some(DatabaseSection {
                url: Some("sqlite://file.db".to_string()),
            }),
            dataset: None,
            analytics: Some(AnalyticsSection {
                anchor_start_year: Some(2018),
                anchor_end_year: None,
                sub_call_timeout_secs: Some(4),
            }),
        };

        let config = AppConfig::merge(&cli(Some(9000), None), &file).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.database_url, "sqlite://file.db");
        assert_eq!(config.sub_call_timeout, Duration::from_secs(4));
        assert_eq!(config.anchor_start_year, 2018);
        assert_eq!(config.anchor_end_year, 2025);
    }

    #[test]
    fn test_rejects_inverted_anchor_years() {
        let file = TomlConfig {
            analytics: Some(AnalyticsSection {
                anchor_start_year: Some(2030),
                anchor_end_year: Some(2020),
                sub_call_timeout_secs: None,
            }),
            ..TomlConfig::default()
        };

        assert!(AppConfig::merge(&cli(Some(5000), Some("memory://")), &file).is_err());
    }

    #[test]
    fn test_rejects_bad_dataset_url_and_zero_timeout() {
        let mut bad_url = cli(Some(5000), Some("memory://"));
        bad_url.dataset_url = Some("not a url".to_string());
        assert!(AppConfig::merge(&bad_url, &TomlConfig::default()).is_err());

        let mut zero_timeout = cli(Some(5000), Some("memory://"));
        zero_timeout.sub_call_timeout_secs = Some(0);
        assert!(AppConfig::merge(&zero_timeout, &TomlConfig::default()).is_err());
    }

    #[test]
    fn test_env_file_supplies_required_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "PORT=6123\nDATABASE_URL=sqlite://from-dotenv.db\n").unwrap();
        std::env::remove_var("PORT");
        std::env::remove_var("DATABASE_URL");

        let loaded = load_env_file(Some(&path)).unwrap();
        let cli = CliConfig::try_parse_from(["sales-dashboard"]).unwrap();
        std::env::remove_var("PORT");
        std::env::remove_var("DATABASE_URL");

        assert_eq!(loaded, Some(path));
        let config = AppConfig::merge(&cli, &TomlConfig::default()).unwrap();
        assert_eq!(config.port, 6123);
        assert_eq!(config.database_url, "sqlite://from-dotenv.db");
    }

    #[test]
    fn test_missing_env_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let loaded = load_env_file(Some(&dir.path().join(".env"))).unwrap();
        assert_eq!(loaded, None);
    }
}
