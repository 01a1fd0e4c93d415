//! 命令控制台（操作面）
//!
//! 每个命令 1:1 映射到编排器或存储的一个操作：
//! - `start` - 启动一轮队列处理（后台任务）
//! - `stop`  - 设置取消标志，当前条目完成后停止
//! - `stats` - 队列与统计记录汇总
//! - `reset` - 所有 failed 重置回 pending
//! - `logs`  - 最近的执行日志
//! - `add <标识符> [优先级]` - 入队（upsert）
//! - `exit`  - 退出（如有运行先取消并等待）

use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::orchestrator::App;
use crate::services::{QueueService, RunLogService, StatService};
use crate::utils::logging::truncate_text;

/// 交互式命令循环，读 stdin 直到 exit
pub async fn run(config: Config, pool: SqlitePool) -> Result<()> {
    print_help();

    let queue = QueueService::new(pool.clone());
    let stats = StatService::new(pool.clone());
    let run_log = RunLogService::new(pool.clone());

    // 当前运行的任务句柄 + 它的取消标志
    let mut current_run: Option<(JoinHandle<()>, Arc<AtomicBool>)> = None;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };

        match command {
            "start" => {
                if let Some((handle, _)) = &current_run {
                    if !handle.is_finished() {
                        warn!("⚠️ 已有运行在进行中，先 stop 或等待其结束");
                        continue;
                    }
                }
                let app = App::new(config.clone(), pool.clone());
                let cancel = app.cancel_flag();
                let handle = tokio::spawn(async move {
                    match app.run().await {
                        Ok(report) => {
                            info!(
                                "运行结束: 处理 {} / 成功 {} / 失败 {} (completed={})",
                                report.processed, report.succeeded, report.failed, report.completed
                            );
                        }
                        Err(e) => error!("❌ 运行失败: {:#}", e),
                    }
                });
                current_run = Some((handle, cancel));
            }

            "stop" => match &current_run {
                Some((handle, cancel)) if !handle.is_finished() => {
                    cancel.store(true, Ordering::SeqCst);
                    info!("🛑 已请求停止，当前条目完成后退出");
                }
                _ => warn!("没有正在进行的运行"),
            },

            "stats" => match stats.get_stats_summary().await {
                Ok(summary) => {
                    println!("{}", "─".repeat(40));
                    println!(
                        "队列:  pending {} | processing {} | completed {} | failed {}",
                        summary.pending, summary.processing, summary.completed, summary.failed
                    );
                    println!(
                        "记录:  共 {} 条 | 成功 {} | 失败 {}",
                        summary.records_total, summary.records_success, summary.records_failure
                    );
                    println!("日志:  {} 条", summary.log_entries);
                    println!("{}", "─".repeat(40));
                }
                Err(e) => error!("读取汇总失败: {}", e),
            },

            "reset" => match queue.reset_failed().await {
                Ok(count) => info!("♻️ 已把 {} 个失败条目重置为 pending", count),
                Err(e) => error!("重置失败: {}", e),
            },

            "logs" => match run_log.recent(20).await {
                Ok(entries) => {
                    for entry in entries {
                        println!(
                            "#{} [{}] {} {}ms 字段:{} {}",
                            entry.id,
                            entry.phase,
                            entry.identifier,
                            entry.duration_ms.unwrap_or(0),
                            entry.fields_extracted.unwrap_or(0),
                            truncate_text(entry.message.as_deref().unwrap_or(""), 60),
                        );
                    }
                }
                Err(e) => error!("读取日志失败: {}", e),
            },

            "add" => {
                let Some(value) = parts.next() else {
                    warn!("用法: add <标识符> [优先级]");
                    continue;
                };
                let priority: i64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
                match queue.enqueue(value, priority).await {
                    Ok(()) => info!("✓ 已入队: {} (优先级 {})", value, priority),
                    Err(e) => error!("入队失败: {}", e),
                }
            }

            "exit" => {
                if let Some((handle, cancel)) = current_run.take() {
                    if !handle.is_finished() {
                        cancel.store(true, Ordering::SeqCst);
                        info!("等待当前条目完成...");
                        let _ = handle.await;
                    }
                }
                info!("👋 再见");
                break;
            }

            "help" => print_help(),

            other => warn!("未知命令: {} (输入 help 查看用法)", other),
        }
    }

    Ok(())
}

fn print_help() {
    println!("{}", "─".repeat(40));
    println!("可用命令:");
    println!("  start             启动队列处理");
    println!("  stop              取消当前运行");
    println!("  stats             查看汇总统计");
    println!("  reset             失败条目重置为 pending");
    println!("  logs              查看最近执行日志");
    println!("  add <标识符> [优先级]  入队");
    println!("  exit              退出");
    println!("{}", "─".repeat(40));
}
