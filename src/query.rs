//! # Query Builder
//!
//! Turns a sparse search form into a parameterized `SELECT` over the
//! `sdvx_stats` table. User input only ever reaches SQLite through the
//! positional parameter list; the SQL text is assembled from registered
//! column keys and `?` placeholders alone.
//!
//! Besides the general search, this module owns the two fixed queries of the
//! site: the home page ranking and the standard-score lookup.

use crate::columns::{self, Column, FilterKey, TABLE_NAME, UnknownColumnKind};
use crate::form::FormData;
use itertools::Itertools;
use rusqlite::types::Value;

/// Columns the formatter cannot do without. Inserted at the front, one at a time, in this order.
const REQUIRED_KEYS: [&str; 3] = ["count", "difficulty_name", "music_title"];

/// Columns shown in the home page ranking.
const RANKING_KEYS: [&str; 8] = [
    "music_title",
    "difficulty_name",
    "level",
    "artist",
    "count",
    "avg_score",
    "avg_vf_10_i",
    "avg_skill_12_h",
];
const RANKING_LEVELS: [i64; 3] = [18, 19, 20];
const RANKING_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("invalid value for {field}: {value:?}")]
    InvalidFilterValue { field: &'static str, value: String },
    #[error(transparent)]
    UnknownColumn(#[from] UnknownColumnKind),
}

impl QueryError {
    fn invalid(field: &'static str, value: &str) -> Self {
        QueryError::InvalidFilterValue {
            field,
            value: value.to_string(),
        }
    }
}

/// Raw filter values as submitted, keyed by filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    values: Vec<(FilterKey, Vec<String>)>,
}

impl FilterSpec {
    /// Collects the recognized filter fields of a form. Anything else is ignored.
    pub fn from_form(form: &FormData) -> Self {
        let mut spec = FilterSpec::default();
        for key in FilterKey::ALL {
            for v in form.get_all(key.field_name()) {
                spec.push(key, v);
            }
        }
        spec
    }

    pub fn push(&mut self, key: FilterKey, value: impl Into<String>) {
        let value = value.into();
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some((_, vs)) => vs.push(value),
            None => self.values.push((key, vec![value])),
        }
    }

    pub fn get(&self, key: FilterKey) -> &[String] {
        self.values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, vs)| vs.as_slice())
            .unwrap_or(&[])
    }
}

/// A query ready to run, together with everything the formatter needs to render its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
    /// Resolved selection; result rows are aligned to it.
    pub selection: Vec<&'static Column>,
    pub is_percent: bool,
    /// Whether the play count column was asked for (as opposed to pulled in as required).
    pub show_count: bool,
}

/// Resolves the caller's selection into the columns actually queried.
///
/// Returns the columns and whether `count` was among the caller's own keys.
pub fn resolve_selection<S: AsRef<str>>(
    keys: &[S],
) -> Result<(Vec<&'static Column>, bool), UnknownColumnKind> {
    if keys.is_empty() {
        return Ok((columns::display_columns().iter().collect(), false));
    }
    let mut selection = keys
        .iter()
        .map(|k| columns::column(k.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    let show_count = selection.iter().any(|c| c.key == "count");
    for key in REQUIRED_KEYS {
        if !selection.iter().any(|c| c.key == key) {
            selection.insert(0, columns::column(key)?);
        }
    }
    Ok((selection, show_count))
}

/// Builds the search query for the given filters and selection.
pub fn build_query<S: AsRef<str>>(
    filters: &FilterSpec,
    selection: &[S],
    is_percent: bool,
) -> Result<BuiltQuery, QueryError> {
    let (selection, show_count) = resolve_selection(selection)?;

    let mut conditions = vec![];
    let mut params = vec![];
    for key in FilterKey::ALL {
        let raw = filters.get(key);
        match key {
            FilterKey::Level => {
                let levels = raw
                    .iter()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| {
                        v.trim()
                            .parse::<i64>()
                            .map_err(|_| QueryError::invalid(key.field_name(), v))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if !levels.is_empty() {
                    conditions.push(in_clause(key.column_key(), levels.len()));
                    params.extend(levels.into_iter().map(Value::Integer));
                }
            }
            FilterKey::Difficulty => {
                let names = raw
                    .iter()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| {
                        v.trim()
                            .parse::<usize>()
                            .ok()
                            .and_then(columns::difficulty_name)
                            .ok_or_else(|| QueryError::invalid(key.field_name(), v))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if !names.is_empty() {
                    conditions.push(in_clause(key.column_key(), names.len()));
                    params.extend(names.into_iter().map(|n| Value::Text(n.to_string())));
                }
            }
            FilterKey::MusicTitle | FilterKey::Artist => {
                // Only the first value counts; an empty string means "no filter".
                if let Some(v) = raw.first().filter(|v| !v.is_empty()) {
                    conditions.push(format!("{} LIKE ? ESCAPE '\\'", key.column_key()));
                    params.push(Value::Text(format!("%{}%", escape_like(v))));
                }
            }
        }
    }

    let mut sql = format!(
        "SELECT {} FROM {}",
        selection.iter().map(|c| c.key).join(", "),
        TABLE_NAME
    );
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    Ok(BuiltQuery {
        sql,
        params,
        selection,
        is_percent,
        show_count,
    })
}

/// Builds the search query straight from a submitted search form.
pub fn search_query(form: &FormData) -> Result<BuiltQuery, QueryError> {
    // 0: 人数表示, 1: 達成率表示
    let is_percent = match form.get("format").map(str::trim) {
        None | Some("") => false,
        Some(v) => {
            v.parse::<i64>()
                .map_err(|_| QueryError::invalid("format", v))?
                != 0
        }
    };
    let selection: Vec<&str> = columns::display_columns()
        .iter()
        .map(|c| c.key)
        .filter(|k| form.is_checked(k))
        .collect();
    build_query(&FilterSpec::from_form(form), &selection, is_percent)
}

/// The home page ranking: the ten lowest average scores among level 18-20 charts of
/// MAXIMUM-equivalent difficulty (the charts most likely to appear in a top-10).
pub fn ranking_query() -> Result<BuiltQuery, QueryError> {
    let (selection, _) = resolve_selection(&RANKING_KEYS)?;
    let difficulties = &columns::DIFFICULTIES[3..];
    let sql = format!(
        "SELECT {} FROM {} WHERE difficulty_name IN ({}) AND level IN ({}) ORDER BY avg_score ASC LIMIT {}",
        selection.iter().map(|c| c.key).join(", "),
        TABLE_NAME,
        placeholders(difficulties.len()),
        placeholders(RANKING_LEVELS.len()),
        RANKING_LIMIT,
    );
    let params = difficulties
        .iter()
        .map(|d| Value::Text(d.to_string()))
        .chain(RANKING_LEVELS.iter().map(|&l| Value::Integer(l)))
        .collect();
    Ok(BuiltQuery {
        sql,
        params,
        selection,
        is_percent: false,
        show_count: true,
    })
}

/// Looks up the statistics of one song for the standard-score page.
///
/// `difficulties` is the comma-joined `ss_difficulty` field; each token is a
/// difficulty index or an exact difficulty name. A blank field matches every difficulty.
pub fn standard_score_query(title: &str, difficulties: &str) -> Result<BuiltQuery, QueryError> {
    let names = difficulties
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<usize>()
                .ok()
                .and_then(columns::difficulty_name)
                .or_else(|| columns::difficulty_index(t).and_then(columns::difficulty_name))
                .ok_or_else(|| QueryError::invalid("ss_difficulty", t))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let selection: Vec<&'static Column> = columns::display_columns().iter().collect();
    let mut sql = format!(
        "SELECT {} FROM {} WHERE music_title = ?",
        selection.iter().map(|c| c.key).join(", "),
        TABLE_NAME
    );
    let mut params = vec![Value::Text(title.to_string())];
    if !names.is_empty() {
        sql.push_str(" AND ");
        sql.push_str(&in_clause("difficulty_name", names.len()));
        params.extend(names.into_iter().map(|n| Value::Text(n.to_string())));
    }
    Ok(BuiltQuery {
        sql,
        params,
        selection,
        is_percent: true,
        show_count: true,
    })
}

/// Escapes LIKE wildcards so the pattern matches `s` literally.
fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

fn in_clause(column: &str, n: usize) -> String {
    format!("{} IN ({})", column, placeholders(n))
}
