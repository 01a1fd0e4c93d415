//! 统计记录服务 - 业务能力层
//!
//! 职责：
//! - 维护 player_stats 表（每个标识符至多一条记录）
//! - 成功时整行覆盖并清空错误信息
//! - 失败时只写元数据和错误信息，数值字段保留上一次成功的读数

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::AppResult;
use crate::models::{PlayerStats, StatRecord, StatsSummary};

/// 统计记录服务
#[derive(Clone)]
pub struct StatService {
    pool: SqlitePool,
}

impl StatService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 成功 upsert：全字段覆盖，error_message 清空
    pub async fn upsert_success(
        &self,
        value: &str,
        display_name: &str,
        source_url: &str,
        stats: &PlayerStats,
    ) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO player_stats (
                value, display_name, source_url,
                kills, deaths, assists, headshots,
                matches_played, matches_won, matches_lost, matches_tied,
                rounds_played, total_damage,
                adr, kd_ratio, hltv_rating,
                win_rate, headshot_percentage, clutch_success, entry_success,
                last_attempt_at, success, error_message
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, NULL)
            ON CONFLICT(value) DO UPDATE SET
                display_name = excluded.display_name,
                source_url = excluded.source_url,
                kills = excluded.kills,
                deaths = excluded.deaths,
                assists = excluded.assists,
                headshots = excluded.headshots,
                matches_played = excluded.matches_played,
                matches_won = excluded.matches_won,
                matches_lost = excluded.matches_lost,
                matches_tied = excluded.matches_tied,
                rounds_played = excluded.rounds_played,
                total_damage = excluded.total_damage,
                adr = excluded.adr,
                kd_ratio = excluded.kd_ratio,
                hltv_rating = excluded.hltv_rating,
                win_rate = excluded.win_rate,
                headshot_percentage = excluded.headshot_percentage,
                clutch_success = excluded.clutch_success,
                entry_success = excluded.entry_success,
                last_attempt_at = excluded.last_attempt_at,
                success = 1,
                error_message = NULL
            "#,
        )
        .bind(value)
        .bind(display_name)
        .bind(source_url)
        .bind(stats.kills)
        .bind(stats.deaths)
        .bind(stats.assists)
        .bind(stats.headshots)
        .bind(stats.matches_played)
        .bind(stats.matches_won)
        .bind(stats.matches_lost)
        .bind(stats.matches_tied)
        .bind(stats.rounds_played)
        .bind(stats.total_damage)
        .bind(stats.adr)
        .bind(stats.kd_ratio)
        .bind(stats.hltv_rating)
        .bind(&stats.win_rate)
        .bind(&stats.headshot_percentage)
        .bind(&stats.clutch_success)
        .bind(&stats.entry_success)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!("统计写入成功: {} ({} 个字段)", value, stats.field_count());
        Ok(())
    }

    /// 失败 upsert：只写元数据 + 错误信息，数值字段不动
    pub async fn upsert_failure(&self, value: &str, error_message: &str) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO player_stats (value, last_attempt_at, success, error_message)
            VALUES (?, ?, 0, ?)
            ON CONFLICT(value) DO UPDATE SET
                last_attempt_at = excluded.last_attempt_at,
                success = 0,
                error_message = excluded.error_message
            "#,
        )
        .bind(value)
        .bind(&now)
        .bind(error_message)
        .execute(&self.pool)
        .await?;

        debug!("统计写入失败记录: {} ({})", value, error_message);
        Ok(())
    }

    /// 读取某个标识符的最近记录
    pub async fn get_record(&self, value: &str) -> AppResult<Option<StatRecord>> {
        let record = sqlx::query_as::<_, StatRecord>("SELECT * FROM player_stats WHERE value = ?")
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    /// `stats` 命令的汇总：队列各状态行数 + 记录成败数 + 日志条数
    pub async fn get_stats_summary(&self) -> AppResult<StatsSummary> {
        let mut summary = StatsSummary::default();

        let queue_rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM identifier_queue GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        for (status, count) in queue_rows {
            match status.as_str() {
                "pending" => summary.pending = count,
                "processing" => summary.processing = count,
                "completed" => summary.completed = count,
                "failed" => summary.failed = count,
                _ => {}
            }
        }

        let (total, success): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(success), 0) FROM player_stats",
        )
        .fetch_one(&self.pool)
        .await?;
        summary.records_total = total;
        summary.records_success = success;
        summary.records_failure = total - success;

        let (log_entries,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM execution_log")
            .fetch_one(&self.pool)
            .await?;
        summary.log_entries = log_entries;

        Ok(summary)
    }
}
