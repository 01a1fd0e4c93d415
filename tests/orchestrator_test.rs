//! 编排器与持久化契约的集成测试
//!
//! 数据库用内存 SQLite（单连接池），渲染源用桩实现注入，
//! 不需要浏览器即可覆盖队列状态机的全部性质

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::Ordering;

use cs_stats_scraper::browser::DocumentSource;
use cs_stats_scraper::config::Config;
use cs_stats_scraper::error::{AppError, AppResult, FetchError};
use cs_stats_scraper::models::{DocumentSnapshot, QueueStatus, RawDocument, RawNode};
use cs_stats_scraper::orchestrator::App;
use cs_stats_scraper::services::{QueueService, RunLogService, StatService};
use cs_stats_scraper::storage;

/// 测试配置：限速关掉，批大小取小值
fn test_config() -> Config {
    Config {
        batch_size: 10,
        item_delay_ms: 0,
        batch_delay_ms: 0,
        ..Config::default()
    }
}

/// 标签 + 数值的统计行
fn stat_row(label: &str, value: &str) -> RawNode {
    RawNode::new("div", "").with_children(vec![
        RawNode::new("span", label),
        RawNode::new("span", value),
    ])
}

/// 数值卡片（数值的容器与标签互为兄弟）
fn stat_card(label: &str, value: &str) -> RawNode {
    RawNode::new("div", "").with_children(vec![
        RawNode::new("div", label),
        RawNode::new("div", "").with_children(vec![RawNode::new("span", value)]),
    ])
}

fn snapshot(title: &str, children: Vec<RawNode>) -> DocumentSnapshot {
    DocumentSnapshot::from_raw(RawDocument {
        title: title.to_string(),
        root: RawNode::new("body", "").with_children(children),
    })
}

/// 渲染契约的桩实现：固定快照，指定标识符返回 404
struct StubSource {
    docs: HashMap<String, DocumentSnapshot>,
    not_ok: HashSet<String>,
}

impl StubSource {
    fn new() -> Self {
        Self {
            docs: HashMap::new(),
            not_ok: HashSet::new(),
        }
    }

    fn with_doc(mut self, value: &str, doc: DocumentSnapshot) -> Self {
        self.docs.insert(value.to_string(), doc);
        self
    }

    fn with_not_ok(mut self, value: &str) -> Self {
        self.not_ok.insert(value.to_string());
        self
    }
}

#[async_trait]
impl DocumentSource for StubSource {
    async fn fetch_document(&self, value: &str) -> AppResult<DocumentSnapshot> {
        if self.not_ok.contains(value) {
            return Err(AppError::Fetch(FetchError::NotOk {
                url: format!("stub://{}", value),
                status: 404,
            }));
        }
        self.docs.get(value).cloned().ok_or_else(|| {
            AppError::Fetch(FetchError::Timeout {
                url: format!("stub://{}", value),
                budget_ms: 0,
            })
        })
    }
}

// ========== 持久化契约 ==========

#[tokio::test]
async fn test_enqueue_upsert_uniqueness() {
    let pool = storage::init_memory_db().await.unwrap();
    let queue = QueueService::new(pool.clone());

    queue.enqueue("player-1", 1).await.unwrap();
    queue.enqueue("player-1", 7).await.unwrap();

    // 恰好一行，第二次入队只更新优先级
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM identifier_queue")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let items = queue.list_pending(10).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].priority, 7);
}

#[tokio::test]
async fn test_batch_selection_ordering() {
    let pool = storage::init_memory_db().await.unwrap();
    let queue = QueueService::new(pool);

    // A 和 B 同优先级（A 先创建），C 低优先级
    queue.enqueue("A", 5).await.unwrap();
    queue.enqueue("B", 5).await.unwrap();
    queue.enqueue("C", 1).await.unwrap();

    let batch = queue.list_pending(2).await.unwrap();
    let values: Vec<&str> = batch.iter().map(|i| i.value.as_str()).collect();
    assert_eq!(values, vec!["A", "B"]);
}

#[tokio::test]
async fn test_reset_failed_leaves_completed_untouched() {
    let pool = storage::init_memory_db().await.unwrap();
    let queue = QueueService::new(pool);

    queue.enqueue("bad", 0).await.unwrap();
    queue.enqueue("good", 0).await.unwrap();
    queue.set_status("bad", QueueStatus::Processing).await.unwrap();
    queue.set_status("bad", QueueStatus::Failed).await.unwrap();
    queue.set_status("good", QueueStatus::Processing).await.unwrap();
    queue.set_status("good", QueueStatus::Completed).await.unwrap();

    let reset = queue.reset_failed().await.unwrap();
    assert_eq!(reset, 1);
    assert_eq!(
        queue.current_status("bad").await.unwrap(),
        Some(QueueStatus::Pending)
    );
    assert_eq!(
        queue.current_status("good").await.unwrap(),
        Some(QueueStatus::Completed)
    );
}

#[tokio::test]
async fn test_illegal_transition_rejected() {
    let pool = storage::init_memory_db().await.unwrap();
    let queue = QueueService::new(pool);

    queue.enqueue("p", 0).await.unwrap();
    queue.set_status("p", QueueStatus::Processing).await.unwrap();
    queue.set_status("p", QueueStatus::Completed).await.unwrap();

    // completed 不允许直接回到 processing
    let err = queue.set_status("p", QueueStatus::Processing).await;
    assert!(err.is_err());
    assert_eq!(
        queue.current_status("p").await.unwrap(),
        Some(QueueStatus::Completed)
    );
}

#[tokio::test]
async fn test_recover_stale_processing() {
    let pool = storage::init_memory_db().await.unwrap();
    let queue = QueueService::new(pool);

    queue.enqueue("crashed", 0).await.unwrap();
    queue
        .set_status("crashed", QueueStatus::Processing)
        .await
        .unwrap();

    let recovered = queue.recover_stale().await.unwrap();
    assert_eq!(recovered, 1);
    assert_eq!(
        queue.current_status("crashed").await.unwrap(),
        Some(QueueStatus::Pending)
    );
}

// ========== 批次循环 ==========

#[tokio::test]
async fn test_failure_isolation_in_batch() {
    let pool = storage::init_memory_db().await.unwrap();
    let queue = QueueService::new(pool.clone());

    queue.enqueue("ok-1", 3).await.unwrap();
    queue.enqueue("bad", 2).await.unwrap();
    queue.enqueue("ok-2", 1).await.unwrap();

    let source = StubSource::new()
        .with_doc("ok-1", snapshot("a - stats", vec![stat_row("Kills", "100")]))
        .with_not_ok("bad")
        .with_doc("ok-2", snapshot("b - stats", vec![stat_row("Kills", "200")]));

    let app = App::new(test_config(), pool.clone());
    let report = app.process_queue(&source).await.unwrap();

    // 第 2 个条目失败，第 1、3 个仍然到达终态
    assert_eq!(report.processed, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert!(report.completed);

    assert_eq!(
        queue.current_status("ok-1").await.unwrap(),
        Some(QueueStatus::Completed)
    );
    assert_eq!(
        queue.current_status("bad").await.unwrap(),
        Some(QueueStatus::Failed)
    );
    assert_eq!(
        queue.current_status("ok-2").await.unwrap(),
        Some(QueueStatus::Completed)
    );

    // 失败条目的错误信息已落库
    let stats = StatService::new(pool);
    let record = stats.get_record("bad").await.unwrap().unwrap();
    assert!(!record.success);
    assert!(record.error_message.unwrap().contains("404"));
}

#[tokio::test]
async fn test_zero_field_extraction_never_succeeds() {
    let pool = storage::init_memory_db().await.unwrap();
    let queue = QueueService::new(pool.clone());
    queue.enqueue("empty", 0).await.unwrap();

    // 页面可达但没有任何可识别字段
    let source = StubSource::new().with_doc(
        "empty",
        snapshot(
            "empty - page",
            vec![RawNode::new("p", "No matches recorded yet.")],
        ),
    );

    let app = App::new(test_config(), pool.clone());
    let report = app.process_queue(&source).await.unwrap();
    assert_eq!(report.failed, 1);

    assert_eq!(
        queue.current_status("empty").await.unwrap(),
        Some(QueueStatus::Failed)
    );
    let record = StatService::new(pool)
        .get_record("empty")
        .await
        .unwrap()
        .unwrap();
    assert!(!record.success);
    assert!(record.error_message.is_some());
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let pool = storage::init_memory_db().await.unwrap();
    let queue = QueueService::new(pool.clone());
    queue.enqueue("X", 0).await.unwrap();

    let source = StubSource::new().with_doc(
        "X",
        snapshot(
            "playerX - CS2 Stats",
            vec![stat_card("K/D", "1.34"), stat_row("Headshot %", "42%")],
        ),
    );

    let app = App::new(test_config(), pool.clone());
    let report = app.process_queue(&source).await.unwrap();
    assert_eq!(report.succeeded, 1);

    assert_eq!(
        queue.current_status("X").await.unwrap(),
        Some(QueueStatus::Completed)
    );

    let record = StatService::new(pool.clone())
        .get_record("X")
        .await
        .unwrap()
        .unwrap();
    assert!(record.success);
    assert_eq!(record.kd_ratio, Some(1.34));
    assert_eq!(record.headshot_percentage.as_deref(), Some("42%"));
    assert_eq!(record.display_name.as_deref(), Some("playerX"));
    assert!(record.error_message.is_none());

    // 审计日志到达 success 终态并带字段数
    let logs = RunLogService::new(pool).recent(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].phase, "success");
    assert_eq!(logs[0].fields_extracted, Some(2));
}

#[tokio::test]
async fn test_failure_preserves_last_good_reading() {
    let pool = storage::init_memory_db().await.unwrap();
    let queue = QueueService::new(pool.clone());
    queue.enqueue("p", 0).await.unwrap();

    // 第一轮：成功写入数值
    let good = StubSource::new().with_doc(
        "p",
        snapshot("p - stats", vec![stat_row("Kills", "4821")]),
    );
    App::new(test_config(), pool.clone())
        .process_queue(&good)
        .await
        .unwrap();

    // 外部重置后第二轮：页面 404
    queue.set_status("p", QueueStatus::Pending).await.unwrap();
    let bad = StubSource::new().with_not_ok("p");
    App::new(test_config(), pool.clone())
        .process_queue(&bad)
        .await
        .unwrap();

    // 失败只覆盖元数据，上一次成功的数值读数保留
    let record = StatService::new(pool)
        .get_record("p")
        .await
        .unwrap()
        .unwrap();
    assert!(!record.success);
    assert!(record.error_message.is_some());
    assert_eq!(record.kills, Some(4821));
}

#[tokio::test]
async fn test_cancellation_returns_partial_result() {
    let pool = storage::init_memory_db().await.unwrap();
    let queue = QueueService::new(pool.clone());
    queue.enqueue("p1", 0).await.unwrap();
    queue.enqueue("p2", 0).await.unwrap();

    let source = StubSource::new()
        .with_doc("p1", snapshot("a - s", vec![stat_row("Kills", "1")]))
        .with_doc("p2", snapshot("b - s", vec![stat_row("Kills", "2")]));

    let app = App::new(test_config(), pool.clone());
    // 开始前就置取消标志：不得处理任何条目
    app.cancel_flag().store(true, Ordering::SeqCst);
    let report = app.process_queue(&source).await.unwrap();

    assert!(!report.completed);
    assert_eq!(report.processed, 0);
    // 取消不得把任何条目留在 processing
    assert_eq!(
        queue.current_status("p1").await.unwrap(),
        Some(QueueStatus::Pending)
    );
    assert_eq!(
        queue.current_status("p2").await.unwrap(),
        Some(QueueStatus::Pending)
    );
}

#[tokio::test]
async fn test_empty_queue_completes_immediately() {
    let pool = storage::init_memory_db().await.unwrap();
    let app = App::new(test_config(), pool);
    let report = app.process_queue(&StubSource::new()).await.unwrap();
    assert!(report.completed);
    assert_eq!(report.processed, 0);
}

#[tokio::test]
async fn test_stats_summary_counts() {
    let pool = storage::init_memory_db().await.unwrap();
    let queue = QueueService::new(pool.clone());
    queue.enqueue("ok", 1).await.unwrap();
    queue.enqueue("bad", 0).await.unwrap();

    let source = StubSource::new()
        .with_doc("ok", snapshot("ok - s", vec![stat_row("Kills", "5")]))
        .with_not_ok("bad");
    App::new(test_config(), pool.clone())
        .process_queue(&source)
        .await
        .unwrap();

    let summary = StatService::new(pool).get_stats_summary().await.unwrap();
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.pending, 0);
    assert_eq!(summary.records_total, 2);
    assert_eq!(summary.records_success, 1);
    assert_eq!(summary.records_failure, 1);
    assert_eq!(summary.log_entries, 2);
}
