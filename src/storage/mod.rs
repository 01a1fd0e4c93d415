//! 存储层
//!
//! SQLite（sqlx）连接池与建表引导。连接按逻辑操作从池中取用、
//! 用完即还，长批次在条目间隔期间不占用连接。

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::error::{AppResult, StorageError};

/// 建表语句：首次运行自动引导，重复执行无副作用
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS identifier_queue (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    value       TEXT    NOT NULL UNIQUE,
    status      TEXT    NOT NULL DEFAULT 'pending',
    priority    INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_queue_status ON identifier_queue(status);

CREATE TABLE IF NOT EXISTS player_stats (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    value               TEXT    NOT NULL UNIQUE,
    display_name        TEXT,
    source_url          TEXT,
    kills               INTEGER,
    deaths              INTEGER,
    assists             INTEGER,
    headshots           INTEGER,
    matches_played      INTEGER,
    matches_won         INTEGER,
    matches_lost        INTEGER,
    matches_tied        INTEGER,
    rounds_played       INTEGER,
    total_damage        INTEGER,
    adr                 REAL,
    kd_ratio            REAL,
    hltv_rating         REAL,
    win_rate            TEXT,
    headshot_percentage TEXT,
    clutch_success      TEXT,
    entry_success       TEXT,
    last_attempt_at     TEXT,
    success             INTEGER NOT NULL DEFAULT 0,
    error_message       TEXT
);

CREATE TABLE IF NOT EXISTS execution_log (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    identifier       TEXT NOT NULL,
    phase            TEXT NOT NULL,
    message          TEXT,
    duration_ms      INTEGER,
    fields_extracted INTEGER,
    created_at       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_log_identifier ON execution_log(identifier);
"#;

/// 打开（必要时创建）数据库文件并引导表结构
pub async fn init_db(path: &str) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| StorageError::OpenFailed {
            path: path.to_string(),
            source: Box::new(e),
        })?;

    apply_schema(&pool).await?;
    info!("✓ 数据库就绪: {}", path);
    Ok(pool)
}

/// 内存数据库（测试用）
///
/// 注意 max_connections 必须为 1：每条内存连接各自是一个独立的库
pub async fn init_memory_db() -> AppResult<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .map_err(|e| StorageError::OpenFailed {
            path: ":memory:".to_string(),
            source: Box::new(e),
        })?;

    apply_schema(&pool).await?;
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> AppResult<()> {
    for statement in SCHEMA.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
