//! # Column Ontology
//!
//! The single registry of every column in the `sdvx_stats` table: its key,
//! display label, semantic group and storage type. The query builder, the
//! importer, the result formatter and the search form all read from here, so
//! adding or removing a statistic only touches `COLUMNS_DATA`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Name of the score statistics table.
pub const TABLE_NAME: &str = "sdvx_stats";

/// Semantic group a column belongs to. Drives how the formatter renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnGroup {
    /// The chart's music title (rendered as links).
    Title,
    /// The difficulty name (rendered with a per-difficulty CSS class).
    Difficulty,
    /// Number of players of the chart. Denominator of achievement rates.
    Count,
    /// Plain chart metadata such as level and artist.
    Info,
    /// Achiever count of one clear mark (PLAYED .. PUC).
    ClearMark,
    /// Achiever count of one score grade (B .. 998).
    ScoreGrade,
    /// Average score or standard deviation of some player bracket.
    Average,
}

/// SQLite storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    pub fn as_sql(self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    pub group: ColumnGroup,
    pub sql_type: SqlType,
}

const fn col(
    key: &'static str,
    label: &'static str,
    group: ColumnGroup,
    sql_type: SqlType,
) -> Column {
    Column {
        key,
        label,
        group,
        sql_type,
    }
}

use ColumnGroup::*;
use SqlType::*;

// Canonical order: this is both the table layout and the "show everything" display order.
const COLUMNS_DATA: &[Column] = &[
    col("music_title", "楽曲名", Title, Text),
    col("difficulty_name", "難易度", Difficulty, Text),
    col("level", "レベル", Info, Integer),
    col("artist", "作曲者", Info, Text),
    col("count", "プレイ人数", Count, Integer),
    // クリアマーク
    col("played", "PLAYED", ClearMark, Integer),
    col("comp", "COMP", ClearMark, Integer),
    col("ex_comp", "EX_COMP", ClearMark, Integer),
    col("uc", "UC", ClearMark, Integer),
    col("per", "PUC", ClearMark, Integer),
    // スコアグレード
    col("grade_B", "B", ScoreGrade, Integer),
    col("grade_A", "A", ScoreGrade, Integer),
    col("grade_Ap", "A+", ScoreGrade, Integer),
    col("grade_AA", "AA", ScoreGrade, Integer),
    col("grade_AAp", "AA+", ScoreGrade, Integer),
    col("grade_AAA", "AAA", ScoreGrade, Integer),
    col("grade_AAAp", "AAA+", ScoreGrade, Integer),
    col("grade_S", "S", ScoreGrade, Integer),
    col("grade_995", "995", ScoreGrade, Integer),
    col("grade_998", "998", ScoreGrade, Integer),
    col("avg_score", "平均スコア", Average, Real),
    col("sd_score", "標準偏差", Average, Real),
    // スキルレベル帯ごとの平均スコア
    col("avg_skill_u8", "～雷電", Average, Real),
    col("avg_skill_9", "魔騎士", Average, Real),
    col("avg_skill_10", "剛力羅", Average, Real),
    col("avg_skill_11", "或帝滅斗", Average, Real),
    col("avg_skill_12_n", "無枠暴龍天", Average, Real),
    col("avg_skill_12_g", "金枠暴龍天", Average, Real),
    col("avg_skill_12_h", "後光暴龍天", Average, Real),
    // VF帯ごとの平均スコア
    col("avg_vf_u7", "～アルジェント", Average, Real),
    col("avg_vf_8_i_ii", "エルドラ1, 2", Average, Real),
    col("avg_vf_8_iii_iv", "エルドラ3, 4", Average, Real),
    col("avg_vf_9_i", "クリムゾン1", Average, Real),
    col("avg_vf_9_ii", "クリムゾン2", Average, Real),
    col("avg_vf_9_iii", "クリムゾン3", Average, Real),
    col("avg_vf_9_iv", "クリムゾン4", Average, Real),
    col("avg_vf_10_i", "インペリアル1", Average, Real),
    col("avg_vf_10_ii", "インペリアル2", Average, Real),
];

/// The difficulty enum, indexed by the integer values the search form submits.
pub const DIFFICULTIES: [&str; 9] = [
    "NOVICE", "ADVANCED", "EXHAUST", "MAXIMUM", "INFINITE", "GRAVITY", "HEAVENLY", "VIVID",
    "EXCEED",
];

static COLUMN_MAP: Lazy<HashMap<&'static str, &'static Column>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for c in COLUMNS_DATA.iter() {
        m.insert(c.key, c);
    }
    m
});

/// Raised when code references a column key that is not registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown column kind: {0}")]
pub struct UnknownColumnKind(pub String);

/// All columns, in canonical order.
pub fn all_columns() -> &'static [Column] {
    COLUMNS_DATA
}

/// Every registered column is displayable, so the display ontology is the full list.
pub fn display_columns() -> &'static [Column] {
    COLUMNS_DATA
}

pub fn get_column(key: &str) -> Option<&'static Column> {
    COLUMN_MAP.get(key).copied()
}

pub fn column(key: &str) -> Result<&'static Column, UnknownColumnKind> {
    get_column(key).ok_or_else(|| UnknownColumnKind(key.to_string()))
}

pub fn label(key: &str) -> Result<&'static str, UnknownColumnKind> {
    column(key).map(|c| c.label)
}

pub fn is_display(key: &str) -> bool {
    get_column(key).is_some()
}

pub fn is_clear_mark(key: &str) -> bool {
    get_column(key).is_some_and(|c| c.group == ClearMark)
}

pub fn is_score_grade(key: &str) -> bool {
    get_column(key).is_some_and(|c| c.group == ScoreGrade)
}

/// Whether `field` is one of the recognized filter form fields.
pub fn is_filter(field: &str) -> bool {
    FilterKey::from_field(field).is_some()
}

pub fn difficulty_name(index: usize) -> Option<&'static str> {
    DIFFICULTIES.get(index).copied()
}

pub fn difficulty_index(name: &str) -> Option<usize> {
    DIFFICULTIES.iter().position(|&d| d == name)
}

/// A search filter, identified on the wire by its form field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Level,
    Difficulty,
    MusicTitle,
    Artist,
}

impl FilterKey {
    /// All filters, in the order their predicates appear in a WHERE clause.
    pub const ALL: [FilterKey; 4] = [
        FilterKey::Level,
        FilterKey::Difficulty,
        FilterKey::MusicTitle,
        FilterKey::Artist,
    ];

    pub fn field_name(self) -> &'static str {
        match self {
            FilterKey::Level => "level_filter",
            FilterKey::Difficulty => "difficulty",
            FilterKey::MusicTitle => "music_title_filter",
            FilterKey::Artist => "artist_filter",
        }
    }

    /// The table column this filter constrains.
    pub fn column_key(self) -> &'static str {
        match self {
            FilterKey::Level => "level",
            FilterKey::Difficulty => "difficulty_name",
            FilterKey::MusicTitle => "music_title",
            FilterKey::Artist => "artist",
        }
    }

    pub fn from_field(field: &str) -> Option<FilterKey> {
        FilterKey::ALL.into_iter().find(|f| f.field_name() == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ontology_has_expected_shape() {
        assert_eq!(all_columns().len(), 38);
        assert_eq!(all_columns()[0].key, "music_title");
        assert_eq!(all_columns()[37].key, "avg_vf_10_ii");
        let clear: Vec<&str> = all_columns()
            .iter()
            .filter(|c| c.group == ColumnGroup::ClearMark)
            .map(|c| c.key)
            .collect();
        assert_eq!(clear, vec!["played", "comp", "ex_comp", "uc", "per"]);
        assert_eq!(
            all_columns()
                .iter()
                .filter(|c| c.group == ColumnGroup::ScoreGrade)
                .count(),
            10
        );
    }

    #[test]
    fn keys_are_unique() {
        assert_eq!(COLUMN_MAP.len(), all_columns().len());
    }

    #[test]
    fn label_lookup() {
        assert_eq!(label("per"), Ok("PUC"));
        assert_eq!(label("avg_vf_10_i"), Ok("インペリアル1"));
        assert_eq!(
            label("no_such_column"),
            Err(UnknownColumnKind("no_such_column".to_string()))
        );
    }

    #[test]
    fn group_membership() {
        assert!(is_clear_mark("uc"));
        assert!(!is_clear_mark("grade_S"));
        assert!(is_score_grade("grade_998"));
        assert!(!is_score_grade("count"));
        assert!(is_display("artist"));
        assert!(!is_display("level_filter"));
        assert!(is_filter("level_filter"));
        assert!(is_filter("artist_filter"));
        assert!(!is_filter("artist"));
    }

    #[test]
    fn difficulty_enum() {
        assert_eq!(DIFFICULTIES.len(), 9);
        assert_eq!(difficulty_name(0), Some("NOVICE"));
        assert_eq!(difficulty_name(8), Some("EXCEED"));
        assert_eq!(difficulty_name(9), None);
        assert_eq!(difficulty_index("MAXIMUM"), Some(3));
        assert_eq!(difficulty_index("maximum"), None);
    }

    #[test]
    fn filter_keys_map_to_registered_columns() {
        for f in FilterKey::ALL {
            assert!(get_column(f.column_key()).is_some(), "{:?}", f);
            assert_eq!(FilterKey::from_field(f.field_name()), Some(f));
        }
    }
}
