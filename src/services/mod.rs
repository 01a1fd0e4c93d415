//! 业务能力层（Services）
//!
//! 每个服务对应持久化契约的一张表，只暴露"我能做什么"：
//! - `QueueService` - 标识符队列（状态机写入的唯一入口）
//! - `StatService` - 统计记录 upsert 与汇总
//! - `RunLogService` - 每次尝试的审计日志
//!
//! 服务不持有连接，只持有池；连接按逻辑操作取用、用完即还

pub mod log_service;
pub mod queue_service;
pub mod stat_service;

pub use log_service::RunLogService;
pub use queue_service::QueueService;
pub use stat_service::StatService;
