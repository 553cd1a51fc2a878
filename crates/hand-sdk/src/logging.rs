//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 默认日志级别
const DEFAULT_DIRECTIVE: &str = "info";

/// 安装全局日志订阅器（默认级别 `info`，可由 `RUST_LOG` 覆盖）
///
/// 同时把 `log` crate 的记录转发到 `tracing`。重复调用是无害的。
pub fn init_logging() {
    init_logging_with(DEFAULT_DIRECTIVE);
}

/// 以指定的默认过滤指令安装日志订阅器
///
/// `RUST_LOG` 存在且合法时优先使用。返回是否由本次调用完成安装。
pub fn init_logging_with(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }
    // log 记录桥接；其它 logger 已安装时保留原 logger
    let _ = tracing_log::LogTracer::init();
    true
}
