use clap::Parser;
use sales_dashboard::config::load_env_file;
use sales_dashboard::utils::logger;
use sales_dashboard::{AppConfig, AppState, CliConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` 必須在解析命令列前載入，clap 才讀得到其中的變數
    let env_file = load_env_file(None);
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(cli.verbose, cli.json_logs);

    match env_file {
        Ok(Some(path)) => tracing::info!("Loaded environment from {}", path.display()),
        Ok(None) => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!("⚠️ {}", e),
    }

    tracing::info!("Starting sales-dashboard");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 缺少必要配置時直接終止，不延後到請求階段
    let config = match AppConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::from_config(&config)?;
    tracing::info!(
        "📦 Record store ready, anchor years {}-{}",
        config.anchor_start_year,
        config.anchor_end_year
    );

    sales_dashboard::serve(&config, Arc::new(state)).await?;
    Ok(())
}
