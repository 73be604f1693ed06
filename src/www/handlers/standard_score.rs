//! # Standard Score Page
//!
//! Reached through a music title link (`/?ss_music=<title>`), which shows the
//! calculator form, and through that form's submission, which computes the
//! standard score of the entered score from the first matching chart and
//! lists the statistics of every matching chart.

use super::AppState;
use crate::query;
use crate::results::{escape_html, render_rows_with_header};
use crate::stats::{format_decimal, validate_and_score};
use anyhow::Result;
use serde_json::json;

pub fn render(
    state: &AppState,
    music_title: &str,
    difficulty: &str,
    score: &str,
    submitted: bool,
) -> Result<String> {
    let mut ss_results = String::from("<h3>スコアを入力してください。</h3>\n");
    let mut data_info = String::new();
    let mut results_header = String::new();
    let mut results = String::new();

    if submitted {
        let query = query::standard_score_query(music_title, difficulty)?;
        let rows = state.db.select(&query.sql, &query.params)?;
        match rows.first() {
            Some(first) => {
                let mean = first.get_option::<f64>("avg_score")?;
                let stddev = first.get_option::<f64>("sd_score")?;
                ss_results = match validate_and_score(score, mean, stddev) {
                    Ok(v) => format!("<h3>偏差値は{}です。</h3>\n", format_decimal(v)),
                    Err(e) => format!("<h3>{}</h3>\n", e),
                };
                data_info = format!("<h4>'{}'の統計データ</h4>\n", escape_html(music_title));
                (results_header, results) = render_rows_with_header(&rows, &query, false)?;
            }
            None => ss_results = String::from("<h3>検索結果が見つかりませんでした。</h3>\n"),
        }
    }

    state.templates.render_page(
        "ss",
        &format!("偏差値計算 {}", music_title),
        json!({
            "music_title": format!("'{}'", music_title),
            "ss_music": music_title,
            "ss_results": ss_results,
            "data_info": data_info,
            "results_header": results_header,
            "results": results,
        }),
    )
}
