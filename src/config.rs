use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const ENV_DB_PATH: &str = "QUIZ_DB_PATH";
pub const ENV_BIND_ADDR: &str = "QUIZ_BIND_ADDR";
pub const ENV_DEBUG: &str = "QUIZ_DEBUG";

pub const DEFAULT_DB_PATH: &str = "bible_quiz.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置项 {key} 的值无效: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// 应用配置
///
/// 启动时构建一次，显式传给服务端。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub debug: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意键值来源构建配置，缺失的键使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup(ENV_DB_PATH)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let bind_raw = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: ENV_BIND_ADDR,
                value: bind_raw.clone(),
            })?;

        let debug = match lookup(ENV_DEBUG) {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidValue {
                key: ENV_DEBUG,
                value: raw,
            })?,
            None => false,
        };

        Ok(Self {
            db_path,
            bind_addr,
            debug,
        })
    }

    /// 未设置 RUST_LOG 时使用的日志过滤
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
