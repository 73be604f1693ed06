//! # Result Table Rendering
//!
//! Renders query results as the rows of an HTML table.
//!
//! Layout of a row: an optional rank, then one cell per selected column,
//! except that the music title expands into a video-search cell followed by
//! the title cell, and the play count is left out unless it was asked for.
//! The header applies the same rules, so header and body always line up.
//!
//! Clear marks and score grades are shown either as raw achiever counts or as
//! achievement rates (achievers / players, in percent). Rates are tagged with
//! one of four CSS classes so the stylesheet can highlight rare achievements.

use crate::columns::{Column, ColumnGroup};
use crate::query::BuiltQuery;
use crate::sql::{Database, Row};
use crate::stats::{format_decimal, round3};
use anyhow::{Context, Result, bail};
use rusqlite::types::Value;

const VIDEO_SEARCH_URL: &str = "https://www.youtube.com/results?search_query=";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableOptions {
    pub is_percent: bool,
    pub show_count: bool,
    pub is_ranking: bool,
}

impl TableOptions {
    pub fn for_query(query: &BuiltQuery, is_ranking: bool) -> Self {
        TableOptions {
            is_percent: query.is_percent,
            show_count: query.show_count,
            is_ranking,
        }
    }
}

/// Rarity bucket of an achievement rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateClass {
    Zero,
    /// Up to 0.10%.
    VeryRare,
    /// Up to 1.00%.
    Rare,
    Common,
}

impl RateClass {
    pub fn of(rate: f64) -> Self {
        if rate <= 0.0 {
            RateClass::Zero
        } else if rate <= 0.10 {
            RateClass::VeryRare
        } else if rate <= 1.00 {
            RateClass::Rare
        } else {
            RateClass::Common
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            RateClass::Zero => "achiever_rate_zero",
            RateClass::VeryRare => "achiever_rate_very_rare",
            RateClass::Rare => "achiever_rate_rare",
            RateClass::Common => "achiever_rate_common",
        }
    }
}

/// Achievement rate in percent, rounded to 3 places, and its bucket.
///
/// A chart nobody played has rate 0. Inconsistent counts are clamped to [0, 100].
pub fn achiever_rate(achievers: i64, total: i64) -> (f64, RateClass) {
    let rate = if total <= 0 {
        0.0
    } else {
        round3(achievers as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    };
    (rate, RateClass::of(rate))
}

/// Renders the header row.
pub fn render_header(selection: &[&Column], options: TableOptions) -> String {
    let mut header = String::from("<tr>\n");
    if options.is_ranking {
        header.push_str("<th class='con' id='rank'>RANK</th>\n");
    }
    header.push_str("<th class='con' id='0'>動画</th>\n");
    for (index, column) in selection.iter().enumerate() {
        if column.group == ColumnGroup::Count && !options.show_count {
            continue;
        }
        let suffix = match column.group {
            ColumnGroup::ClearMark | ColumnGroup::ScoreGrade if options.is_percent => " (%)",
            ColumnGroup::ClearMark | ColumnGroup::ScoreGrade => " (人)",
            _ => "",
        };
        header.push_str(&format!(
            "<th class='con' id='{}'>{}{}</th>\n",
            index + 1,
            column.label,
            suffix
        ));
    }
    header.push_str("</tr>\n");
    header
}

/// Renders the body rows. Each row must be aligned to `selection`.
pub fn render_rows(rows: &[Row], selection: &[&Column], options: TableOptions) -> Result<String> {
    let count_index = selection
        .iter()
        .position(|c| c.group == ColumnGroup::Count)
        .context("selection has no play count column")?;

    let mut body = String::new();
    for (n, row) in rows.iter().enumerate() {
        if row.len() != selection.len() {
            bail!(
                "row #{} has {} values but {} columns were selected",
                n,
                row.len(),
                selection.len()
            );
        }
        body.push_str("<tr>\n");
        if options.is_ranking {
            body.push_str(&format!("<td class=\"rank\">{}</td>\n", n + 1));
        }
        for (i, column) in selection.iter().enumerate() {
            let value = row.value(i).unwrap_or(&Value::Null);
            match column.group {
                ColumnGroup::Title => body.push_str(&title_cells(&display(value))),
                ColumnGroup::Difficulty => {
                    let name = display(value);
                    body.push_str(&cell(&format!("difficulty_{}", name), &name));
                }
                ColumnGroup::ClearMark | ColumnGroup::ScoreGrade if options.is_percent => {
                    let total = row.value(count_index).map_or(0, count);
                    let (rate, class) = achiever_rate(count(value), total);
                    body.push_str(&cell(class.css_class(), &format_decimal(rate)));
                }
                ColumnGroup::Count if !options.show_count => {}
                _ => body.push_str(&cell(column.key, &display(value))),
            }
        }
        body.push_str("</tr>\n");
    }
    Ok(body)
}

/// Runs `query` against `db` and renders `(header, body)`.
pub fn render_table(db: &Database, query: &BuiltQuery, is_ranking: bool) -> Result<(String, String)> {
    let rows = db.select(&query.sql, &query.params)?;
    render_rows_with_header(&rows, query, is_ranking)
}

/// Renders already fetched rows of `query` as `(header, body)`.
pub fn render_rows_with_header(
    rows: &[Row],
    query: &BuiltQuery,
    is_ranking: bool,
) -> Result<(String, String)> {
    let options = TableOptions::for_query(query, is_ranking);
    let header = render_header(&query.selection, options);
    let body = render_rows(rows, &query.selection, options)?;
    Ok((header, body))
}

fn cell(class: &str, text: &str) -> String {
    format!("<td class=\"{}\">{}</td>\n", escape_html(class), escape_html(text))
}

/// The video-search link cell and the standard-score link cell of a music title.
fn title_cells(title: &str) -> String {
    let encoded = urlencoding::encode(title);
    format!(
        "<td class=\"video\"><a href=\"{}{}+sdvx\" target=\"_blank\" rel=\"noopener\">動画</a></td>\
         <td class=\"music_title\"><a href=\"/?ss_music={}\" class=\"data\">{}</a></td>\n",
        VIDEO_SEARCH_URL,
        encoded,
        encoded,
        escape_html(title)
    )
}

/// A stored count as an integer. Fractions are truncated; NULL and text count as 0.
fn count(value: &Value) -> i64 {
    match value {
        Value::Integer(i) => *i,
        Value::Real(f) => f.trunc() as i64,
        _ => 0,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => format_decimal(*f),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

/// A simple utility to escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
