//! 流程层（Workflow）
//!
//! 定义"一个标识符"的完整处理流程：
//! 记录开始 → 置 processing → 抓取 → 提取 → 落库 → 终态

pub mod item_ctx;
pub mod item_flow;

pub use item_ctx::ItemCtx;
pub use item_flow::{ItemFlow, ItemOutcome};
