//! 条目处理流程 - 流程层
//!
//! 核心职责：定义"一个标识符"的完整处理流程
//!
//! 流程顺序：
//! 1. 追加 `started` 审计日志
//! 2. 状态 → processing
//! 3. 抓取文档 → 提取字段
//! 4. 成功：统计整行覆盖 → completed → 日志终态 success
//! 5. 失败（传输 / 超时 / 无数据 / 任何意外）：失败 upsert（数值
//!    字段不动）→ failed → 日志终态 failed
//!
//! 任何条目级错误都在这里被吃掉并落库，绝不向批次层传播 ——
//! 单个条目的失败不允许中止整个批次

use std::time::Instant;
use tracing::{error, info, warn};

use crate::browser::DocumentSource;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::extraction;
use crate::models::{Extraction, QueueStatus};
use crate::services::{QueueService, RunLogService, StatService};
use crate::workflow::item_ctx::ItemCtx;

/// 条目处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// 处理成功
    Success { fields_extracted: usize },
    /// 处理失败（已落库为 failed）
    Failed,
}

/// 条目处理流程
///
/// - 编排单个标识符的完整处理
/// - 不持有任何资源（page / 浏览器）
/// - 只依赖业务能力（services）和渲染契约（DocumentSource）
pub struct ItemFlow {
    queue: QueueService,
    stats: StatService,
    run_log: RunLogService,
    verbose_logging: bool,
}

impl ItemFlow {
    /// 创建新的条目处理流程
    pub fn new(
        queue: QueueService,
        stats: StatService,
        run_log: RunLogService,
        config: &Config,
    ) -> Self {
        Self {
            queue,
            stats,
            run_log,
            verbose_logging: config.verbose_logging,
        }
    }

    /// 处理一个标识符，必达终态
    ///
    /// 返回值只区分成功/失败供批次层计数；错误细节已经落库
    pub async fn run(&self, source: &dyn DocumentSource, ctx: &ItemCtx) -> ItemOutcome {
        let started = Instant::now();
        info!("[条目 {}] 🔍 开始处理: {}", ctx.item_index, ctx.value);

        // 1. 审计日志先行：崩溃时至少留下 started 记录
        let log_id = match self.run_log.log_start(&ctx.value).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!("[条目 {}] 写入开始日志失败: {}", ctx.item_index, e);
                None
            }
        };

        // 2. 认领条目
        if let Err(e) = self.queue.set_status(&ctx.value, QueueStatus::Processing).await {
            error!("[条目 {}] 置 processing 失败: {}", ctx.item_index, e);
        }

        // 3. 抓取 + 提取
        match self.fetch_and_extract(source, ctx).await {
            Ok(extraction) => {
                let fields = extraction.stats.field_count();
                self.record_success(ctx, &extraction, log_id, &started).await;
                info!(
                    "[条目 {}] ✅ 完成: {} ({} 个字段, 耗时 {}ms)",
                    ctx.item_index,
                    extraction.display_name,
                    fields,
                    started.elapsed().as_millis()
                );
                ItemOutcome::Success {
                    fields_extracted: fields,
                }
            }
            Err(err) => {
                if err.is_no_data() {
                    warn!("[条目 {}] ⚠️ 页面无统计数据: {}", ctx.item_index, ctx.value);
                } else {
                    warn!("[条目 {}] ⚠️ 失败: {}", ctx.item_index, err);
                }
                self.record_failure(ctx, &err, log_id, &started).await;
                ItemOutcome::Failed
            }
        }
    }

    /// 抓取文档并提取字段
    ///
    /// 这里是唯一允许 `?` 向上抛的地方，错误统一在 run() 里收口
    async fn fetch_and_extract(
        &self,
        source: &dyn DocumentSource,
        ctx: &ItemCtx,
    ) -> AppResult<Extraction> {
        let doc = source.fetch_document(&ctx.value).await?;
        let extraction = extraction::extract(&doc)?;

        if self.verbose_logging {
            info!(
                "[条目 {}] 提取结果: name={} fields={}",
                ctx.item_index,
                extraction.display_name,
                extraction.stats.field_count()
            );
        }
        Ok(extraction)
    }

    /// 成功落库：统计覆盖 + completed + 日志终态
    async fn record_success(
        &self,
        ctx: &ItemCtx,
        extraction: &Extraction,
        log_id: Option<i64>,
        started: &Instant,
    ) {
        let duration_ms = started.elapsed().as_millis() as i64;

        if let Err(e) = self
            .stats
            .upsert_success(
                &ctx.value,
                &extraction.display_name,
                &ctx.source_url,
                &extraction.stats,
            )
            .await
        {
            error!("[条目 {}] 统计写入失败: {}", ctx.item_index, e);
        }

        if let Err(e) = self.queue.set_status(&ctx.value, QueueStatus::Completed).await {
            error!("[条目 {}] 置 completed 失败: {}", ctx.item_index, e);
        }

        if let Some(id) = log_id {
            let fields = extraction.stats.field_count() as i64;
            if let Err(e) = self.run_log.log_success(id, duration_ms, fields).await {
                error!("[条目 {}] 日志终态更新失败: {}", ctx.item_index, e);
            }
        }
    }

    /// 失败落库：失败 upsert（保留上次数值）+ failed + 日志终态
    async fn record_failure(
        &self,
        ctx: &ItemCtx,
        err: &AppError,
        log_id: Option<i64>,
        started: &Instant,
    ) {
        let duration_ms = started.elapsed().as_millis() as i64;
        let message = err.to_string();

        if let Err(e) = self.stats.upsert_failure(&ctx.value, &message).await {
            error!("[条目 {}] 失败记录写入失败: {}", ctx.item_index, e);
        }

        if let Err(e) = self.queue.set_status(&ctx.value, QueueStatus::Failed).await {
            error!("[条目 {}] 置 failed 失败: {}", ctx.item_index, e);
        }

        if let Some(id) = log_id {
            if let Err(e) = self.run_log.log_failure(id, duration_ms, &message).await {
                error!("[条目 {}] 日志终态更新失败: {}", ctx.item_index, e);
            }
        }
    }
}
