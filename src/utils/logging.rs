//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::models::JudgeResult;

/// 初始化日志：终端输出，同时追加写入日志文件
///
/// `RUST_LOG` 优先；未设置时按 `verbose_logging` 选择 debug 或 info。
pub fn init(config: &Config) -> Result<()> {
    let default_level = if config.verbose_logging { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_file = init_log_file(&config.output_log_file)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .try_init()?;
    Ok(())
}

/// 初始化日志文件，写入带时间的表头
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<File> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    let log_header = format!(
        "{}\n评测提交日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    file.write_all(log_header.as_bytes())?;
    Ok(file)
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 远程评测提交");
    info!("🌐 评测机: {}", config.uoj_addr);
    info!("👤 账号: {}", config.username);
    info!("⏱️ 轮询间隔: {:?}", config.poll_interval());
    info!("{}", "=".repeat(60));
}

/// 记录一次评测结果更新
pub fn log_update(result: &JudgeResult) {
    if result.is_terminal() {
        info!("{}", "─".repeat(60));
        info!("📊 最终结果: {}", result);
        info!("{}", "─".repeat(60));
    } else {
        info!("⏳ 评测中: {:?}", result.status);
    }
    if let Some(error) = &result.details.error {
        warn!("诊断信息: {}", error);
    }
}
