//! # CS Stats Scraper
//!
//! 从第三方渲染的统计页面抓取玩家战绩，用启发式规则把无标记的
//! 文本节点归类为语义化字段，并以可重试的状态机队列持久化进度。
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 goto() / eval() 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务对应一张表
//! - `QueueService` - 标识符队列与状态机写入
//! - `StatService` - 统计记录 upsert 与汇总
//! - `RunLogService` - 每次尝试的审计日志
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个标识符"的完整处理流程
//! - `ItemCtx` - 上下文封装（标识符 + 序号 + 优先级）
//! - `ItemFlow` - 流程编排（日志 → 认领 → 抓取 → 提取 → 落库）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批次循环，管理浏览器资源、
//!   限速与合作式取消
//!
//! 提取引擎（`extraction/`）是独立的纯函数层：文档快照进、
//! 字段集合出，不触碰任何持久化状态。

pub mod browser;
pub mod config;
pub mod console;
pub mod error;
pub mod extraction;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod storage;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{DocumentSource, PageFetcher};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use extraction::extract;
pub use infrastructure::JsExecutor;
pub use models::{DocumentSnapshot, Extraction, PlayerStats, QueueStatus};
pub use orchestrator::{App, RunReport};
pub use workflow::{ItemCtx, ItemFlow, ItemOutcome};
