//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (批次循环：选取 → 逐个处理 → 限速 → 取消检查)
//!     ↓
//! workflow::ItemFlow (处理单个标识符)
//!     ↓
//! services (能力层：queue / stats / run_log)
//!     ↓
//! browser::DocumentSource + infrastructure::JsExecutor (渲染与取值)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一逻辑 worker**：批内条目严格串行，外部站点的速率容忍度
//!    才是瓶颈，不是 CPU
//! 2. **资源隔离**：只有编排层持有 Browser；每次运行恰好获取和
//!    释放一次，任何退出路径都不例外
//! 3. **状态机唯一写者**：运行期间队列状态只由本层（经由 ItemFlow）
//!    转换
//! 4. **失败隔离**：条目级错误全部在流程层收口，本层只统计

pub mod batch_processor;

// 重新导出主要类型
pub use batch_processor::{App, RunReport};
