//! 批量处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **运行生命周期**：获取浏览器 → 批次循环 → 释放浏览器
//! 2. **批次选择**：每轮最多 batch_size 个 pending，priority 降序、
//!    created_at 升序，顺序精确且稳定
//! 3. **限速**：条目间固定间隔，批次间较短间隔（纯等待，不是退避）
//! 4. **合作式取消**：每个条目开始前检查标志，在途条目做完才停
//! 5. **残留恢复**：批次循环开始前把 processing 拨回 pending
//! 6. **全局统计**：汇总 processed / succeeded / failed 与总耗时
//!
//! 条目内部的错误不会到达这里；这里抛出的错误（例如批次选择时
//! 数据库不可达）属于运行级故障，中止整个运行并如实上报

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::browser::{self, DocumentSource, PageFetcher};
use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::services::{QueueService, RunLogService, StatService};
use crate::utils::logging::{init_log_file, log_batch_complete, log_batch_start, log_startup, print_final_stats};
use crate::workflow::{ItemCtx, ItemFlow, ItemOutcome};

/// 一次运行的汇总结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// 处理过的条目数（无论成败）
    pub processed: usize,
    /// 成功条目数
    pub succeeded: usize,
    /// 失败条目数
    pub failed: usize,
    /// true = 队列已清空；false = 被取消的部分结果
    pub completed: bool,
    /// 总耗时
    pub elapsed_ms: u64,
}

/// 应用主结构
pub struct App {
    config: Config,
    pool: SqlitePool,
    cancel: Arc<AtomicBool>,
}

impl App {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        Self {
            config,
            pool,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 取消标志的句柄（控制台 `stop` 命令持有）
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// 运行完整的一轮：获取浏览器，处理队列，释放浏览器
    ///
    /// 浏览器在整个运行内复用，并且在任何退出路径上都恰好释放一次
    pub async fn run(&self) -> Result<RunReport> {
        init_log_file(&self.config.output_log_file)?;
        log_startup(&self.config);

        let (mut browser, page) = if self.config.use_headless {
            browser::launch_headless_browser().await?
        } else {
            browser::connect_to_browser_and_page(self.config.browser_debug_port).await?
        };

        let fetcher = PageFetcher::new(JsExecutor::new(page), &self.config);
        let outcome = self.process_queue(&fetcher).await;

        if let Err(e) = browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }

        outcome
    }

    /// 批次循环（渲染源以契约注入，测试可替换）
    pub async fn process_queue(&self, source: &dyn DocumentSource) -> Result<RunReport> {
        let run_started = Instant::now();
        let queue = QueueService::new(self.pool.clone());
        let flow = ItemFlow::new(
            queue.clone(),
            StatService::new(self.pool.clone()),
            RunLogService::new(self.pool.clone()),
            &self.config,
        );

        // 上次运行崩溃留下的 processing 行先拨回 pending
        let recovered = queue
            .recover_stale()
            .await
            .context("恢复残留 processing 条目失败")?;
        if recovered > 0 {
            warn!("♻️ 已把 {} 个残留 processing 条目拨回 pending", recovered);
        }

        let (pending, _, _, _) = queue
            .status_counts()
            .await
            .context("读取队列计数失败")?;
        info!("📋 队列中有 {} 个待处理标识符", pending);

        let mut report = RunReport::default();
        let mut batch_num = 0usize;

        'run: loop {
            if self.cancel.load(Ordering::SeqCst) {
                report.completed = false;
                break;
            }

            let batch = queue
                .list_pending(self.config.batch_size as i64)
                .await
                .context("拉取待处理批次失败")?;

            if batch.is_empty() {
                report.completed = true;
                break;
            }

            batch_num += 1;
            log_batch_start(batch_num, batch.len());

            for (idx, item) in batch.iter().enumerate() {
                // 合作式取消：只在条目开始前检查，在途条目做完才停
                if self.cancel.load(Ordering::SeqCst) {
                    warn!("🛑 收到取消信号，运行在当前条目后停止");
                    report.completed = false;
                    break 'run;
                }

                let ctx = ItemCtx::new(
                    item.value.clone(),
                    report.processed + 1,
                    item.priority,
                    self.config.profile_url(&item.value),
                );

                report.processed += 1;
                match flow.run(source, &ctx).await {
                    ItemOutcome::Success { .. } => report.succeeded += 1,
                    ItemOutcome::Failed => report.failed += 1,
                }

                // 条目限速（批内最后一个条目之后不再等）
                if idx + 1 < batch.len() {
                    sleep(Duration::from_millis(self.config.item_delay_ms)).await;
                }
            }

            log_batch_complete(batch_num, report.succeeded, report.failed);

            // 批次限速
            sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
        }

        report.elapsed_ms = run_started.elapsed().as_millis() as u64;
        print_final_stats(&report);
        Ok(report)
    }
}
