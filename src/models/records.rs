//! 持久化行模型
//!
//! 时间戳统一存为 RFC3339 文本（UTC），由服务层写入

use sqlx::FromRow;

/// 批次选择的结果：只携带调度所需的信息
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct PendingItem {
    pub value: String,
    pub priority: i64,
}

/// 某个标识符最近一次提取的完整记录
#[derive(Debug, Clone, FromRow)]
pub struct StatRecord {
    pub id: i64,
    pub value: String,
    pub display_name: Option<String>,
    pub source_url: Option<String>,
    pub kills: Option<i64>,
    pub deaths: Option<i64>,
    pub assists: Option<i64>,
    pub headshots: Option<i64>,
    pub matches_played: Option<i64>,
    pub matches_won: Option<i64>,
    pub matches_lost: Option<i64>,
    pub matches_tied: Option<i64>,
    pub rounds_played: Option<i64>,
    pub total_damage: Option<i64>,
    pub adr: Option<f64>,
    pub kd_ratio: Option<f64>,
    pub hltv_rating: Option<f64>,
    pub win_rate: Option<String>,
    pub headshot_percentage: Option<String>,
    pub clutch_success: Option<String>,
    pub entry_success: Option<String>,
    pub last_attempt_at: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
}

/// 一次处理尝试的审计记录
///
/// 以 `started` 创建，结束时原地更新为 `success` 或 `failed`
#[derive(Debug, Clone, FromRow)]
pub struct ExecutionLogEntry {
    pub id: i64,
    pub identifier: String,
    pub phase: String,
    pub message: Option<String>,
    pub duration_ms: Option<i64>,
    pub fields_extracted: Option<i64>,
    pub created_at: String,
}

/// `stats` 命令的汇总输出
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
    pub records_total: i64,
    pub records_success: i64,
    pub records_failure: i64,
    pub log_entries: i64,
}
