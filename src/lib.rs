use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod db;
pub mod export;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod page;
pub mod server;

use config::AppConfig;

/// 初始化日志：优先使用 RUST_LOG，否则使用给定的默认过滤
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // 重复初始化（如测试中）时忽略
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

// 核心入口：读取配置并启动搜索/导出服务
pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(config.default_log_filter());
    info!(
        db = %config.db_path.display(),
        debug = config.debug,
        "starting bible quiz search"
    );
    server::serve(config).await
}
