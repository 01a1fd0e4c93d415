//! 队列状态机
//!
//! 每个标识符的生命周期：`pending → processing → completed | failed`。
//! 状态以显式枚举建模，所有写入前都经过 `can_transition` 校验，
//! 避免自由字符串写出非法状态。

use std::fmt;

/// 标识符在队列中的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueStatus {
    /// 等待处理
    Pending,
    /// 正在处理（运行期间的瞬态，不应持久残留）
    Processing,
    /// 处理成功
    Completed,
    /// 处理失败（可被外部重置回 Pending）
    Failed,
}

impl QueueStatus {
    /// 数据库中的状态字符串
    pub fn as_str(self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Processing => "processing",
            QueueStatus::Completed => "completed",
            QueueStatus::Failed => "failed",
        }
    }

    /// 从数据库字符串解析状态
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(QueueStatus::Pending),
            "processing" => Some(QueueStatus::Processing),
            "completed" => Some(QueueStatus::Completed),
            "failed" => Some(QueueStatus::Failed),
            _ => None,
        }
    }

    /// 校验状态转换是否合法
    ///
    /// 合法转换：
    /// - `pending → processing`（编排器认领条目）
    /// - `processing → completed | failed`（条目终态）
    /// - `processing → pending`（运行开始前的残留恢复）
    /// - `completed | failed → pending`（外部重置）
    pub fn can_transition(self, to: QueueStatus) -> bool {
        use QueueStatus::*;
        matches!(
            (self, to),
            (Pending, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Processing, Pending)
                | (Completed, Pending)
                | (Failed, Pending)
        )
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use QueueStatus::*;

    #[test]
    fn test_round_trip_through_str() {
        for status in [Pending, Processing, Completed, Failed] {
            assert_eq!(QueueStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(QueueStatus::parse("unknown"), None);
    }

    #[test]
    fn test_legal_transitions() {
        assert!(Pending.can_transition(Processing));
        assert!(Processing.can_transition(Completed));
        assert!(Processing.can_transition(Failed));
        // 残留恢复与外部重置
        assert!(Processing.can_transition(Pending));
        assert!(Failed.can_transition(Pending));
        assert!(Completed.can_transition(Pending));
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        // 终态之间不可直接互转
        assert!(!Completed.can_transition(Processing));
        assert!(!Completed.can_transition(Failed));
        assert!(!Failed.can_transition(Completed));
        // pending 不能直接进入终态
        assert!(!Pending.can_transition(Completed));
        assert!(!Pending.can_transition(Failed));
        // 自环不合法
        assert!(!Processing.can_transition(Processing));
        assert!(!Pending.can_transition(Pending));
    }
}
