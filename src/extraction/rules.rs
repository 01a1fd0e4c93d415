//! 提取规则表
//!
//! 把启发式分类策略表达为数据而不是散落的分支：每条规则声明
//! {关键词, 排除词, 数值守卫, 目标字段}，由一个通用匹配器求值。
//! 规则按声明顺序求值，先匹配者获胜 —— 顺序本身是策略的一部分，
//! 调整前先看相应测试。

use crate::models::StatField;

// ========== 命名阈值（歧义消解策略） ==========
// 同一页面可能出现与字段无关的大数（例如对局编号），范围守卫用来
// 防止这类数字被误分类。阈值只允许以命名常量的形式调整。

/// 爆头数上限：高于它的数字不可能是爆头计数
pub const HEADSHOT_COUNT_MAX: i64 = 50_000;
/// 胜/负/平场次上限
pub const MATCH_COUNT_MAX: i64 = 10_000;
/// 回合总数下限：低于它的数字更可能是场次而不是回合数
pub const ROUND_COUNT_MIN: i64 = 1_000;
/// 总伤害下限
pub const TOTAL_DAMAGE_MIN: i64 = 100_000;
/// ADR 的位数范围（2~3 位整数）
pub const ADR_MIN_DIGITS: usize = 2;
pub const ADR_MAX_DIGITS: usize = 3;

/// 数值范围守卫
#[derive(Debug, Clone, Copy)]
pub enum NumericGuard {
    /// 不限制
    None,
    /// 必须小于
    Below(i64),
    /// 必须大于
    Above(i64),
    /// 十进制位数必须落在 [min, max]
    DigitSpan { min: usize, max: usize },
}

impl NumericGuard {
    pub fn allows(self, value: i64) -> bool {
        match self {
            NumericGuard::None => true,
            NumericGuard::Below(limit) => value < limit,
            NumericGuard::Above(limit) => value > limit,
            NumericGuard::DigitSpan { min, max } => {
                let digits = value.to_string().len();
                digits >= min && digits <= max
            }
        }
    }
}

/// 上下文关键词规则
#[derive(Debug)]
pub struct KeywordRule {
    pub target: StatField,
    /// 命中任一关键词即视为上下文匹配（上下文已转小写）
    pub keywords: &'static [&'static str],
    /// 含任一排除词则整条规则不匹配
    pub exclusions: &'static [&'static str],
    pub guard: NumericGuard,
}

impl KeywordRule {
    /// 上下文是否命中本规则（不含数值守卫）
    pub fn context_matches(&self, context: &str) -> bool {
        self.keywords.iter().any(|kw| context.contains(kw))
            && !self.exclusions.iter().any(|ex| context.contains(ex))
    }

    /// 通用匹配器：关键词 + 排除词 + 数值守卫
    pub fn accepts(&self, context: &str, value: i64) -> bool {
        self.context_matches(context) && self.guard.allows(value)
    }
}

/// 小数节点规则：按最近容器祖先的兄弟标签文本路由
pub const DECIMAL_RULES: &[KeywordRule] = &[
    KeywordRule {
        target: StatField::KdRatio,
        keywords: &["k/d", "kd", "kill"],
        exclusions: &[],
        guard: NumericGuard::None,
    },
    KeywordRule {
        target: StatField::HltvRating,
        keywords: &["rating"],
        exclusions: &[],
        guard: NumericGuard::None,
    },
];

/// 百分比节点规则：按父节点全文路由
pub const PERCENT_RULES: &[KeywordRule] = &[
    KeywordRule {
        target: StatField::WinRate,
        keywords: &["win"],
        exclusions: &[],
        guard: NumericGuard::None,
    },
    KeywordRule {
        target: StatField::HeadshotPercentage,
        keywords: &["hs", "headshot"],
        exclusions: &[],
        guard: NumericGuard::None,
    },
    KeywordRule {
        target: StatField::ClutchSuccess,
        keywords: &["clutch"],
        exclusions: &[],
        guard: NumericGuard::None,
    },
    KeywordRule {
        target: StatField::EntrySuccess,
        keywords: &["entry"],
        exclusions: &[],
        guard: NumericGuard::None,
    },
];

/// 整数节点规则：互斥关键词路由 + 数值守卫
///
/// 顺序约定：
/// - kills/deaths 互相排除，避免 "K/D" 类混合上下文被抢注
/// - won/lost/tied 在 played/match 之前，否则 "Matches Won" 会被
///   通用的 match 关键词截走
/// - rounds 在 played 之前且排除于 played 规则，"Rounds Played" 才能
///   落到 rounds_played
pub const INTEGER_RULES: &[KeywordRule] = &[
    KeywordRule {
        target: StatField::Kills,
        keywords: &["kill"],
        exclusions: &["death"],
        guard: NumericGuard::None,
    },
    KeywordRule {
        target: StatField::Deaths,
        keywords: &["death"],
        exclusions: &["kill"],
        guard: NumericGuard::None,
    },
    KeywordRule {
        target: StatField::Assists,
        keywords: &["assist"],
        exclusions: &[],
        guard: NumericGuard::None,
    },
    KeywordRule {
        target: StatField::Headshots,
        keywords: &["headshot"],
        exclusions: &[],
        guard: NumericGuard::Below(HEADSHOT_COUNT_MAX),
    },
    KeywordRule {
        target: StatField::MatchesWon,
        keywords: &["won"],
        exclusions: &[],
        guard: NumericGuard::Below(MATCH_COUNT_MAX),
    },
    KeywordRule {
        target: StatField::MatchesLost,
        keywords: &["lost"],
        exclusions: &[],
        guard: NumericGuard::Below(MATCH_COUNT_MAX),
    },
    KeywordRule {
        target: StatField::MatchesTied,
        keywords: &["tied"],
        exclusions: &[],
        guard: NumericGuard::Below(MATCH_COUNT_MAX),
    },
    KeywordRule {
        target: StatField::RoundsPlayed,
        keywords: &["round"],
        exclusions: &[],
        guard: NumericGuard::Above(ROUND_COUNT_MIN),
    },
    KeywordRule {
        target: StatField::MatchesPlayed,
        keywords: &["played", "match"],
        exclusions: &["round"],
        guard: NumericGuard::None,
    },
    KeywordRule {
        target: StatField::TotalDamage,
        keywords: &["damage"],
        exclusions: &[],
        guard: NumericGuard::Above(TOTAL_DAMAGE_MIN),
    },
    KeywordRule {
        target: StatField::Adr,
        keywords: &["adr"],
        exclusions: &[],
        guard: NumericGuard::DigitSpan {
            min: ADR_MIN_DIGITS,
            max: ADR_MAX_DIGITS,
        },
    },
];

/// 标签邻接兜底目录：部分布局把标签和数值放在相邻兄弟元素里，
/// 上下文关键词路由覆盖不到，按全大写标签精确匹配后在兄弟窗口找值
pub const LABEL_CATALOG: &[(&str, StatField)] = &[
    ("PLAYED", StatField::MatchesPlayed),
    ("KILLS", StatField::Kills),
    ("DAMAGE", StatField::TotalDamage),
    ("WON", StatField::MatchesWon),
    ("DEATHS", StatField::Deaths),
    ("ROUNDS", StatField::RoundsPlayed),
    ("LOST", StatField::MatchesLost),
    ("ASSISTS", StatField::Assists),
    ("TIED", StatField::MatchesTied),
    ("HEADSHOTS", StatField::Headshots),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_boundaries() {
        assert!(NumericGuard::Below(10_000).allows(9_999));
        assert!(!NumericGuard::Below(10_000).allows(10_000));
        assert!(NumericGuard::Above(1_000).allows(1_001));
        assert!(!NumericGuard::Above(1_000).allows(1_000));
        assert!(NumericGuard::DigitSpan { min: 2, max: 3 }.allows(84));
        assert!(NumericGuard::DigitSpan { min: 2, max: 3 }.allows(999));
        assert!(!NumericGuard::DigitSpan { min: 2, max: 3 }.allows(7));
        assert!(!NumericGuard::DigitSpan { min: 2, max: 3 }.allows(1000));
    }

    #[test]
    fn test_exclusions_make_rules_mutually_exclusive() {
        let kills = &INTEGER_RULES[0];
        let deaths = &INTEGER_RULES[1];
        // 混合上下文两边都不认领
        assert!(!kills.accepts("kills / deaths 4821", 4821));
        assert!(!deaths.accepts("kills / deaths 4821", 4821));
        assert!(kills.accepts("kills: 4821", 4821));
        assert!(deaths.accepts("deaths 3190", 3190));
    }

    #[test]
    fn test_rounds_ruled_out_of_matches_played() {
        let played = INTEGER_RULES
            .iter()
            .find(|r| matches!(r.target, StatField::MatchesPlayed))
            .unwrap();
        assert!(played.accepts("matches played 1523", 1523));
        assert!(!played.accepts("rounds played 18452", 18452));
    }
}
