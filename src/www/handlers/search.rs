//! Search results page.

use super::AppState;
use crate::form::FormData;
use crate::query;
use crate::results::render_table;
use anyhow::Result;
use serde_json::json;

/// Builds the query first, so malformed input is rejected before the database is touched.
pub fn render(state: &AppState, form: &FormData) -> Result<String> {
    let query = query::search_query(form)?;
    let (results_header, results) = render_table(&state.db, &query, false)?;
    state.templates.render_page(
        "result",
        "検索結果",
        json!({
            "results_header": results_header,
            "results": results,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryError;
    use crate::sql::Database;
    use crate::www::handlers::template::Templates;

    #[test]
    fn invalid_input_never_reaches_the_database() {
        // 存在しないDBでも、入力エラーが先に返ること
        let state = AppState {
            db: Database::new("/nonexistent/sdvx_stats.db"),
            templates: Templates::new(None).unwrap(),
        };
        let form: FormData = [("submit", "1"), ("difficulty", "42")].into_iter().collect();
        let err = render(&state, &form).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<QueryError>(),
            Some(QueryError::InvalidFilterValue {
                field: "difficulty",
                ..
            })
        ));
    }
}
