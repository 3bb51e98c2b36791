//! 日志初始化
//!
//! 默认级别来自配置，`RUST_LOG` 优先。

use cache_core::LogLevel;

/// 初始化全局日志记录器
///
/// 重复调用时忽略（测试中可能多次初始化）。
pub fn init(level: LogLevel) {
    let env = env_logger::Env::default().filter_or("RUST_LOG", level.as_str());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
