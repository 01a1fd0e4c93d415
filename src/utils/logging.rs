use anyhow::Result;
/// 日志工具模块
///
/// 提供 tracing 初始化和批处理日志的辅助函数
use std::fs;
use tracing::info;

use crate::config::Config;
use crate::orchestrator::RunReport;

/// 初始化 tracing 订阅器
///
/// 默认 info 级别，可通过 RUST_LOG 环境变量覆盖
pub fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n抓取运行日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录运行启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始处理队列 - 单 worker 串行模式");
    info!("📊 批大小: {}", config.batch_size);
    info!(
        "⏱️ 条目间隔: {}ms / 批次间隔: {}ms",
        config.item_delay_ms, config.batch_delay_ms
    );
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `batch_len`: 本批条目数
pub fn log_batch_start(batch_num: usize, batch_len: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {} 批 ({} 个标识符)", batch_num, batch_len);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, succeeded: usize, failed: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 批完成: 累计成功 {} / 失败 {}",
        batch_num, succeeded, failed
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(report: &RunReport) {
    info!("\n{}", "=".repeat(60));
    if report.completed {
        info!("📊 队列处理完毕");
    } else {
        info!("📊 运行被取消（部分结果）");
    }
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", report.succeeded, report.processed);
    info!("❌ 失败: {}", report.failed);
    info!("⏱️ 总耗时: {}ms", report.elapsed_ms);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
