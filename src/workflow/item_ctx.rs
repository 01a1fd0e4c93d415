//! 条目处理上下文
//!
//! 封装"我正在处理哪个标识符"这一信息

use std::fmt::Display;

/// 条目处理上下文
#[derive(Debug, Clone)]
pub struct ItemCtx {
    /// 标识符（外部唯一键）
    pub value: String,

    /// 在本次运行中的序号（仅用于日志显示，从 1 开始）
    pub item_index: usize,

    /// 队列优先级
    pub priority: i64,

    /// 统计页 URL
    pub source_url: String,
}

impl ItemCtx {
    /// 创建新的条目上下文
    pub fn new(value: String, item_index: usize, priority: i64, source_url: String) -> Self {
        Self {
            value,
            item_index,
            priority,
            source_url,
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[标识符#{} 序号#{} 优先级#{}]",
            self.value, self.item_index, self.priority
        )
    }
}
