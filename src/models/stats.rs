//! 玩家统计字段模型
//!
//! 字段集合固定（不做模式推断）。类型在边界处确定：
//! 整数按整数解析，小数按浮点解析，百分比保留字面文本避免精度损失。

use serde::Serialize;

/// 统计字段标签
///
/// 提取规则表用它声明路由目标，写入时再映射到具体字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatField {
    Kills,
    Deaths,
    Assists,
    Headshots,
    MatchesPlayed,
    MatchesWon,
    MatchesLost,
    MatchesTied,
    RoundsPlayed,
    TotalDamage,
    Adr,
    KdRatio,
    HltvRating,
    WinRate,
    HeadshotPercentage,
    ClutchSuccess,
    EntrySuccess,
}

/// 一次成功提取得到的统计字段集合
///
/// 所有字段均为可选：页面布局变化时只提取能识别的部分
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerStats {
    // --- 整数字段 ---
    pub kills: Option<i64>,
    pub deaths: Option<i64>,
    pub assists: Option<i64>,
    pub headshots: Option<i64>,
    pub matches_played: Option<i64>,
    pub matches_won: Option<i64>,
    pub matches_lost: Option<i64>,
    pub matches_tied: Option<i64>,
    pub rounds_played: Option<i64>,
    pub total_damage: Option<i64>,
    // --- 小数字段 ---
    pub adr: Option<f64>,
    pub kd_ratio: Option<f64>,
    pub hltv_rating: Option<f64>,
    // --- 百分比字段（保留字面文本） ---
    pub win_rate: Option<String>,
    pub headshot_percentage: Option<String>,
    pub clutch_success: Option<String>,
    pub entry_success: Option<String>,
}

impl PlayerStats {
    /// 写入整数字段（先到先得：已有值的字段不覆盖）
    pub fn set_int(&mut self, field: StatField, value: i64) {
        let slot = match field {
            StatField::Kills => &mut self.kills,
            StatField::Deaths => &mut self.deaths,
            StatField::Assists => &mut self.assists,
            StatField::Headshots => &mut self.headshots,
            StatField::MatchesPlayed => &mut self.matches_played,
            StatField::MatchesWon => &mut self.matches_won,
            StatField::MatchesLost => &mut self.matches_lost,
            StatField::MatchesTied => &mut self.matches_tied,
            StatField::RoundsPlayed => &mut self.rounds_played,
            StatField::TotalDamage => &mut self.total_damage,
            // adr 来源可能是整数文本节点，按小数字段存储
            StatField::Adr => {
                if self.adr.is_none() {
                    self.adr = Some(value as f64);
                }
                return;
            }
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// 写入小数字段（先到先得）
    pub fn set_decimal(&mut self, field: StatField, value: f64) {
        let slot = match field {
            StatField::Adr => &mut self.adr,
            StatField::KdRatio => &mut self.kd_ratio,
            StatField::HltvRating => &mut self.hltv_rating,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// 写入百分比字段（先到先得，保留字面文本）
    pub fn set_percentage(&mut self, field: StatField, literal: &str) {
        let slot = match field {
            StatField::WinRate => &mut self.win_rate,
            StatField::HeadshotPercentage => &mut self.headshot_percentage,
            StatField::ClutchSuccess => &mut self.clutch_success,
            StatField::EntrySuccess => &mut self.entry_success,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(literal.to_string());
        }
    }

    /// 某个整数字段是否已有值
    pub fn int_field_is_set(&self, field: StatField) -> bool {
        match field {
            StatField::Kills => self.kills.is_some(),
            StatField::Deaths => self.deaths.is_some(),
            StatField::Assists => self.assists.is_some(),
            StatField::Headshots => self.headshots.is_some(),
            StatField::MatchesPlayed => self.matches_played.is_some(),
            StatField::MatchesWon => self.matches_won.is_some(),
            StatField::MatchesLost => self.matches_lost.is_some(),
            StatField::MatchesTied => self.matches_tied.is_some(),
            StatField::RoundsPlayed => self.rounds_played.is_some(),
            StatField::TotalDamage => self.total_damage.is_some(),
            StatField::Adr => self.adr.is_some(),
            _ => false,
        }
    }

    /// 已识别字段数量
    pub fn field_count(&self) -> usize {
        let ints = [
            self.kills,
            self.deaths,
            self.assists,
            self.headshots,
            self.matches_played,
            self.matches_won,
            self.matches_lost,
            self.matches_tied,
            self.rounds_played,
            self.total_damage,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count();
        let decimals = [self.adr, self.kd_ratio, self.hltv_rating]
            .iter()
            .filter(|v| v.is_some())
            .count();
        let percentages = [
            &self.win_rate,
            &self.headshot_percentage,
            &self.clutch_success,
            &self.entry_success,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count();
        ints + decimals + percentages
    }

    /// 是否没有识别出任何字段
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }
}

/// 提取引擎的成功输出：显示名 + 字段集合
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub display_name: String,
    pub stats: PlayerStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_write_wins() {
        let mut stats = PlayerStats::default();
        stats.set_int(StatField::Kills, 4821);
        stats.set_int(StatField::Kills, 9999);
        assert_eq!(stats.kills, Some(4821));

        stats.set_decimal(StatField::KdRatio, 1.34);
        stats.set_decimal(StatField::KdRatio, 0.5);
        assert_eq!(stats.kd_ratio, Some(1.34));

        stats.set_percentage(StatField::WinRate, "52%");
        stats.set_percentage(StatField::WinRate, "99%");
        assert_eq!(stats.win_rate.as_deref(), Some("52%"));
    }

    #[test]
    fn test_field_count_covers_all_families() {
        let mut stats = PlayerStats::default();
        assert!(stats.is_empty());

        stats.set_int(StatField::Kills, 100);
        stats.set_int(StatField::Adr, 84); // 整数节点写入小数字段
        stats.set_decimal(StatField::HltvRating, 1.08);
        stats.set_percentage(StatField::HeadshotPercentage, "42%");

        assert_eq!(stats.adr, Some(84.0));
        assert_eq!(stats.field_count(), 4);
        assert!(!stats.is_empty());
    }
}
