//! 标识符队列服务 - 业务能力层
//!
//! 职责：
//! - 维护 identifier_queue 表（每个 value 恰好一行）
//! - 状态写入的唯一入口，写前校验状态机转换
//! - 批次选择：priority 降序、created_at 升序，顺序精确且稳定

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{AppResult, StorageError};
use crate::models::{PendingItem, QueueStatus};

/// 标识符队列服务
#[derive(Clone)]
pub struct QueueService {
    pool: SqlitePool,
}

impl QueueService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 入队（upsert）：已存在的标识符只更新 priority 和 updated_at，
    /// 状态与 created_at 保持不变
    pub async fn enqueue(&self, value: &str, priority: i64) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO identifier_queue (value, status, priority, created_at, updated_at)
            VALUES (?, 'pending', ?, ?, ?)
            ON CONFLICT(value) DO UPDATE SET
                priority = excluded.priority,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(value)
        .bind(priority)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!("入队: {} (优先级: {})", value, priority);
        Ok(())
    }

    /// 批次选择：最多 limit 个 pending 标识符，
    /// 优先级高者在前，同优先级按创建时间先老后新
    pub async fn list_pending(&self, limit: i64) -> AppResult<Vec<PendingItem>> {
        let items = sqlx::query_as::<_, PendingItem>(
            r#"
            SELECT value, priority FROM identifier_queue
            WHERE status = 'pending'
            ORDER BY priority DESC, created_at ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// 读取当前状态
    pub async fn current_status(&self, value: &str) -> AppResult<Option<QueueStatus>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT status FROM identifier_queue WHERE value = ?")
                .bind(value)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.and_then(|(s,)| QueueStatus::parse(&s)))
    }

    /// 状态转换（写前校验）
    ///
    /// 非法转换（例如 completed → processing）直接拒绝，
    /// 不会产生自由字符串写出的脏状态
    pub async fn set_status(&self, value: &str, to: QueueStatus) -> AppResult<()> {
        let current = self
            .current_status(value)
            .await?
            .ok_or_else(|| StorageError::IdentifierNotFound {
                value: value.to_string(),
            })?;

        if !current.can_transition(to) {
            return Err(StorageError::IllegalTransition {
                value: value.to_string(),
                from: current.as_str().to_string(),
                to: to.as_str().to_string(),
            }
            .into());
        }

        sqlx::query("UPDATE identifier_queue SET status = ?, updated_at = ? WHERE value = ?")
            .bind(to.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(value)
            .execute(&self.pool)
            .await?;

        debug!("状态转换: {} {} -> {}", value, current, to);
        Ok(())
    }

    /// 外部重置：所有 failed 变回 pending，completed 不受影响。
    /// 返回受影响的行数
    pub async fn reset_failed(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE identifier_queue SET status = 'pending', updated_at = ? WHERE status = 'failed'",
        )
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// 残留恢复：上次运行崩溃可能留下 processing 行，
    /// 新一轮运行开始前统一拨回 pending
    pub async fn recover_stale(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE identifier_queue SET status = 'pending', updated_at = ? WHERE status = 'processing'",
        )
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// 各状态的行数（pending, processing, completed, failed）
    pub async fn status_counts(&self) -> AppResult<(i64, i64, i64, i64)> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM identifier_queue GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = (0, 0, 0, 0);
        for (status, count) in rows {
            match QueueStatus::parse(&status) {
                Some(QueueStatus::Pending) => counts.0 = count,
                Some(QueueStatus::Processing) => counts.1 = count,
                Some(QueueStatus::Completed) => counts.2 = count,
                Some(QueueStatus::Failed) => counts.3 = count,
                None => {}
            }
        }
        Ok(counts)
    }
}
