//! 日志初始化
//!
//! 日志级别来自 `PAGE_TRANSLATOR_LOG_LEVEL`，设置 `NO_COLOR` 时关闭 ANSI 颜色。
//! 日志写到 stderr，stdout 留给命令行输出。

use tracing_subscriber::filter::LevelFilter;

use crate::env::{core, EnvVar};

/// 解析日志级别，无法识别时使用 info
pub fn level_filter(level: &str) -> LevelFilter {
    match level {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

/// 终端输出是否使用颜色
pub fn use_color() -> bool {
    !core::NoColor::get().unwrap_or(false)
}

/// 安装全局 fmt 订阅者，重复调用时忽略
pub fn init_logging() {
    let level = core::LogLevel::get().unwrap_or_else(|e| {
        eprintln!("{}", e);
        "info".to_string()
    });

    let installed = tracing_subscriber::fmt()
        .with_max_level(level_filter(&level))
        .with_ansi(use_color())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    if installed.is_err() {
        tracing::debug!("日志订阅者已经初始化");
    }
}
