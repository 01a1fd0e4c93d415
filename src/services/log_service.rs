//! 执行日志服务 - 业务能力层
//!
//! 职责：
//! - 每次处理尝试先以 `started` 追加一条审计记录
//! - 结束时原地更新为终态（success / failed），带耗时与字段数
//! - 只追加和原地更新，从不删除（保留清理给外部的保留策略工具）

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::models::ExecutionLogEntry;

/// 执行日志服务
#[derive(Clone)]
pub struct RunLogService {
    pool: SqlitePool,
}

impl RunLogService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 记录尝试开始，返回日志行 id 供终态更新使用
    pub async fn log_start(&self, identifier: &str) -> AppResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO execution_log (identifier, phase, created_at)
            VALUES (?, 'started', ?)
            "#,
        )
        .bind(identifier)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// 更新为成功终态
    pub async fn log_success(
        &self,
        log_id: i64,
        duration_ms: i64,
        fields_extracted: i64,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE execution_log
            SET phase = 'success', duration_ms = ?, fields_extracted = ?
            WHERE id = ?
            "#,
        )
        .bind(duration_ms)
        .bind(fields_extracted)
        .bind(log_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// 更新为失败终态
    pub async fn log_failure(&self, log_id: i64, duration_ms: i64, message: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE execution_log
            SET phase = 'failed', duration_ms = ?, message = ?
            WHERE id = ?
            "#,
        )
        .bind(duration_ms)
        .bind(message)
        .bind(log_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// 最近的日志条目（新在前），供 `logs` 命令显示
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<ExecutionLogEntry>> {
        let entries = sqlx::query_as::<_, ExecutionLogEntry>(
            "SELECT * FROM execution_log ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
