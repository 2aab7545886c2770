//! 日志初始化
use tracing_subscriber::EnvFilter;

/// 以 JSON 格式输出日志，过滤规则取自配置（`RUST_LOG`）
///
/// 可重复调用，后续调用不生效。
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
