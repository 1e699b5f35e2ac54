//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 安装全局 fmt 订阅者
///
/// 优先读取 `RUST_LOG`，否则按 `verbose` 选择 debug / info。重复初始化会被忽略。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
