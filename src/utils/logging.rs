//! 日志工具模块
//!
//! 提供日志初始化以及格式化输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 `debug` 或 `info`。
/// 重复调用是安全的。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录服务启动信息
pub fn log_startup(bind_addr: &str, model_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 评分标准校验服务启动");
    info!("🌐 监听地址: {}", bind_addr);
    info!("🤖 模型: {}", model_name);
    info!("{}", "=".repeat(60));
}

/// 记录一次分析开始
pub fn log_run_start(generation: u64, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始第 {} 次分析，共 {} 条标准", generation, total);
    info!("{}", "=".repeat(60));
}

/// 记录一次分析结束
pub fn log_run_complete(generation: u64, valid: usize, invalid: usize, failed: usize) {
    info!("\n{}", "─".repeat(60));
    info!("📊 第 {} 次分析完成", generation);
    info!("✅ 有效: {}  ❌ 无效: {}  ⚠️ 失败: {}", valid, invalid, failed);
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
