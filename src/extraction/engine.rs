//! 启发式提取引擎
//!
//! 纯函数：文档快照 → 语义化统计字段。页面上的数字没有可依赖的
//! 结构化标记，只能按文本形态分四族处理（小数 / 百分比 / 整数 /
//! 标签邻接兜底），每族单趟扫描，按文档顺序先到先得。
//!
//! 引擎不触碰任何持久化状态，也没有网络和时钟依赖：同一快照两次
//! 调用产出完全相同。

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ExtractionError;
use crate::extraction::rules::{DECIMAL_RULES, INTEGER_RULES, LABEL_CATALOG, PERCENT_RULES};
use crate::models::{DocumentSnapshot, Extraction, NodeId, PlayerStats};

fn decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+$").expect("固定正则"))
}

fn percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+%$").expect("固定正则"))
}

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("固定正则"))
}

/// 从文档快照中提取统计字段
///
/// 没有识别出任何字段时返回 `NoDataFound` —— 调用方不得把零字段
/// 结果当作成功写库
pub fn extract(doc: &DocumentSnapshot) -> Result<Extraction, ExtractionError> {
    let mut stats = PlayerStats::default();

    classify_decimals(doc, &mut stats);
    classify_percentages(doc, &mut stats);
    classify_integers(doc, &mut stats);
    apply_label_fallback(doc, &mut stats);

    if stats.is_empty() {
        return Err(ExtractionError::NoDataFound);
    }

    Ok(Extraction {
        display_name: resolve_display_name(doc),
        stats,
    })
}

/// 名称解析：优先主标题，其次页面 title 的首段，兜底 "Unknown"
fn resolve_display_name(doc: &DocumentSnapshot) -> String {
    if let Some(heading) = doc.first_heading() {
        return heading.trim().to_string();
    }

    // title 形如 "shroud - CS2 Stats" 或 "shroud | CSstats.gg"，取分隔符前的首段
    let title = doc.title();
    let lead = title
        .split(" | ")
        .next()
        .unwrap_or("")
        .split(" - ")
        .next()
        .unwrap_or("")
        .trim();
    if !lead.is_empty() {
        return lead.to_string();
    }

    "Unknown".to_string()
}

/// 小数族：形如 `1.34` 的节点，按最近容器祖先的兄弟标签文本路由
///
/// K/D 和 Rating 在页面上通常渲染为"数值卡片 + 相邻标签"的结构，
/// 数值节点自身的上下文里没有关键词，要向上跨一层容器找
fn classify_decimals(doc: &DocumentSnapshot, stats: &mut PlayerStats) {
    for id in doc.iter() {
        let text = doc.text(id);
        if !decimal_re().is_match(text) {
            continue;
        }
        let Ok(value) = text.parse::<f64>() else {
            continue;
        };
        let Some(container) = doc.nearest_container(id) else {
            continue;
        };

        let label = sibling_label_text(doc, container);
        for rule in DECIMAL_RULES {
            if rule.context_matches(&label) {
                // 字段已有值时丢弃后续匹配（文档顺序优先）
                stats.set_decimal(rule.target, value);
                break;
            }
        }
    }
}

/// 容器的兄弟标签文本（小写）
fn sibling_label_text(doc: &DocumentSnapshot, container: NodeId) -> String {
    doc.siblings(container)
        .iter()
        .map(|&sibling| doc.subtree_text(sibling))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 百分比族：形如 `42%` 的节点，按父节点全文路由，保留字面文本
fn classify_percentages(doc: &DocumentSnapshot, stats: &mut PlayerStats) {
    for id in doc.iter() {
        let text = doc.text(id);
        if !percent_re().is_match(text) {
            continue;
        }
        let Some(parent) = doc.parent(id) else {
            continue;
        };

        let context = doc.subtree_text(parent).to_lowercase();
        for rule in PERCENT_RULES {
            if rule.context_matches(&context) {
                stats.set_percentage(rule.target, text);
                break;
            }
        }
    }
}

/// 整数族：裸非负整数节点，上下文 = 自身文本 + 父节点全文，
/// 走互斥关键词路由 + 数值守卫
fn classify_integers(doc: &DocumentSnapshot, stats: &mut PlayerStats) {
    for id in doc.iter() {
        let text = doc.text(id);
        if !integer_re().is_match(text) {
            continue;
        }
        let Ok(value) = text.parse::<i64>() else {
            continue;
        };

        let context = match doc.parent(id) {
            Some(parent) => format!("{} {}", text, doc.subtree_text(parent)),
            None => text.to_string(),
        }
        .to_lowercase();

        for rule in INTEGER_RULES {
            if rule.accepts(&context, value) {
                stats.set_int(rule.target, value);
                break;
            }
        }
    }
}

/// 标签邻接兜底：精确匹配全大写标签元素，在其前 2 / 后 2 个兄弟
/// 元素中找第一个整数文本，填入尚未赋值的字段
fn apply_label_fallback(doc: &DocumentSnapshot, stats: &mut PlayerStats) {
    for (label, field) in LABEL_CATALOG {
        if stats.int_field_is_set(*field) {
            continue;
        }
        let Some(node) = doc.iter().find(|&id| doc.text(id) == *label) else {
            continue;
        };

        for sibling in doc.sibling_window(node, 2, 2) {
            let text = doc.subtree_text(sibling);
            let text = text.trim();
            if integer_re().is_match(text) {
                if let Ok(value) = text.parse::<i64>() {
                    stats.set_int(*field, value);
                }
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawDocument, RawNode};

    /// 标签 + 数值的统计行：div > (span 标签, span 数值)
    fn stat_row(label: &str, value: &str) -> RawNode {
        RawNode::new("div", "").with_children(vec![
            RawNode::new("span", label),
            RawNode::new("span", value),
        ])
    }

    /// 数值卡片：div > (div 标签, div > span 数值)
    /// 数值的最近容器是内层 div，标签是它的兄弟
    fn stat_card(label: &str, value: &str) -> RawNode {
        RawNode::new("div", "").with_children(vec![
            RawNode::new("div", label),
            RawNode::new("div", "").with_children(vec![RawNode::new("span", value)]),
        ])
    }

    fn doc_with(title: &str, children: Vec<RawNode>) -> DocumentSnapshot {
        DocumentSnapshot::from_raw(RawDocument {
            title: title.to_string(),
            root: RawNode::new("body", "").with_children(children),
        })
    }

    #[test]
    fn test_integer_disambiguation() {
        // 回合总数不得与总伤害交叉赋值（两者守卫都是大数阈值）
        let doc = doc_with(
            "player - stats",
            vec![
                stat_row("Kills:", "4821"),
                stat_row("Deaths", "3190"),
                stat_row("Rounds Played", "18452"),
            ],
        );
        let result = extract(&doc).unwrap();
        assert_eq!(result.stats.kills, Some(4821));
        assert_eq!(result.stats.deaths, Some(3190));
        assert_eq!(result.stats.rounds_played, Some(18452));
        assert_eq!(result.stats.total_damage, None);
        assert_eq!(result.stats.matches_played, None);
    }

    #[test]
    fn test_decimal_and_percentage_scenario() {
        // 规格场景：K/D 卡片 + 爆头率
        let doc = doc_with(
            "s1mple - CS2 Stats",
            vec![stat_card("K/D", "1.34"), stat_row("Headshot %", "42%")],
        );
        let result = extract(&doc).unwrap();
        assert_eq!(result.stats.kd_ratio, Some(1.34));
        assert_eq!(result.stats.headshot_percentage.as_deref(), Some("42%"));
        assert_eq!(result.display_name, "s1mple");
    }

    #[test]
    fn test_rating_card() {
        let doc = doc_with(
            "t",
            vec![stat_card("HLTV Rating", "1.08"), stat_card("K/D", "0.97")],
        );
        let result = extract(&doc).unwrap();
        assert_eq!(result.stats.hltv_rating, Some(1.08));
        assert_eq!(result.stats.kd_ratio, Some(0.97));
    }

    #[test]
    fn test_percentage_routing() {
        let doc = doc_with(
            "t",
            vec![
                stat_row("Win Rate", "52%"),
                stat_row("Clutch Success", "31%"),
                stat_row("Entry Success", "64%"),
            ],
        );
        let result = extract(&doc).unwrap();
        assert_eq!(result.stats.win_rate.as_deref(), Some("52%"));
        assert_eq!(result.stats.clutch_success.as_deref(), Some("31%"));
        assert_eq!(result.stats.entry_success.as_deref(), Some("64%"));
    }

    #[test]
    fn test_first_match_in_document_order_wins() {
        let doc = doc_with(
            "t",
            vec![stat_row("Kills", "100"), stat_row("Kills", "200")],
        );
        let result = extract(&doc).unwrap();
        assert_eq!(result.stats.kills, Some(100));
    }

    #[test]
    fn test_headshot_guard_rejects_unrelated_large_counter() {
        // 页面上与爆头无关的大计数（如回放编号）不应落入 headshots
        let doc = doc_with(
            "t",
            vec![
                stat_row("Headshot replay id", "99881122"),
                stat_row("Headshots", "12345"),
            ],
        );
        let result = extract(&doc).unwrap();
        assert_eq!(result.stats.headshots, Some(12345));
        assert_eq!(result.stats.matches_played, None);
    }

    #[test]
    fn test_adr_needs_short_integer() {
        let doc = doc_with(
            "t",
            vec![stat_row("ADR", "84"), stat_row("ADR something", "8400")],
        );
        let result = extract(&doc).unwrap();
        assert_eq!(result.stats.adr, Some(84.0));
    }

    #[test]
    fn test_label_adjacency_fallback() {
        // 875 回合低于 ROUND_COUNT_MIN，关键词路由的守卫会拒绝它，
        // 而 "Rounds Played" 上下文又被排除在 matches_played 之外；
        // 这正是标签邻接兜底要接住的布局
        let root = RawNode::new("div", "").with_children(vec![
            RawNode::new("span", "ROUNDS"),
            RawNode::new("span", "—"),
            RawNode::new("span", "875"),
        ]);
        let doc = doc_with("t", vec![root]);
        let result = extract(&doc).unwrap();
        assert_eq!(result.stats.rounds_played, Some(875));
    }

    #[test]
    fn test_label_fallback_does_not_override() {
        let doc = doc_with(
            "t",
            vec![
                stat_row("Kills", "4821"),
                RawNode::new("div", "").with_children(vec![
                    RawNode::new("span", "KILLS"),
                    RawNode::new("span", "1"),
                ]),
            ],
        );
        let result = extract(&doc).unwrap();
        // 关键词路由已赋值，兜底不得覆盖
        assert_eq!(result.stats.kills, Some(4821));
    }

    #[test]
    fn test_no_data_found() {
        let doc = doc_with(
            "empty - page",
            vec![RawNode::new("p", "This player has no recorded matches.")],
        );
        let err = extract(&doc).unwrap_err();
        assert!(matches!(err, ExtractionError::NoDataFound));
    }

    #[test]
    fn test_name_resolution_priority() {
        // h1 优先于 title
        let doc = doc_with(
            "title-name - stats",
            vec![
                RawNode::new("h1", "HeadingName"),
                stat_row("Kills", "10"),
            ],
        );
        assert_eq!(extract(&doc).unwrap().display_name, "HeadingName");

        // 没有 h1 时取 title 首段
        let doc = doc_with("TitleName | CSstats.gg", vec![stat_row("Kills", "10")]);
        assert_eq!(extract(&doc).unwrap().display_name, "TitleName");

        // 都没有时兜底 Unknown
        let doc = doc_with("", vec![stat_row("Kills", "10")]);
        assert_eq!(extract(&doc).unwrap().display_name, "Unknown");
    }

    #[test]
    fn test_extract_is_idempotent() {
        let doc = doc_with(
            "p - stats",
            vec![
                stat_card("K/D", "1.12"),
                stat_row("Kills", "4821"),
                stat_row("Win Rate", "52%"),
            ],
        );
        let first = extract(&doc).unwrap();
        let second = extract(&doc).unwrap();
        assert_eq!(first, second);
    }
}
