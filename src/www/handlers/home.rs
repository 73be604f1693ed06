//! Home page: search form plus the average score ranking.

use super::AppState;
use crate::query;
use crate::results::render_table;
use anyhow::Result;
use serde_json::json;

pub fn render(state: &AppState) -> Result<String> {
    let (results_header, results) = render_table(&state.db, &query::ranking_query()?, true)?;
    state.templates.render_page(
        "home",
        "ホーム",
        json!({
            "results_header": results_header,
            "results": results,
        }),
    )
}
