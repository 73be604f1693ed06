//! # Page Handlers
//!
//! Both `GET /` and `POST /` end up in [`dispatch`], which resolves the form
//! into a [`RequestKind`] and renders the matching page on actix's blocking
//! thread pool (SQLite calls are synchronous).

use crate::form::FormData;
use crate::sql::Database;
use crate::www::request::RequestKind;
use actix_web::{HttpResponse, Responder, web};
use anyhow::Result;
use serde_json::json;

pub mod home;
pub mod search;
pub mod standard_score;
pub mod template;

use template::Templates;

/// Shared, read-only application state.
pub struct AppState {
    pub db: Database,
    pub templates: Templates,
}

pub async fn index_get(
    state: web::Data<AppState>,
    query: web::Query<Vec<(String, String)>>,
) -> impl Responder {
    dispatch(state, FormData::new(query.into_inner())).await
}

pub async fn index_post(
    state: web::Data<AppState>,
    form: web::Form<Vec<(String, String)>>,
) -> impl Responder {
    dispatch(state, FormData::new(form.into_inner())).await
}

async fn dispatch(state: web::Data<AppState>, form: FormData) -> HttpResponse {
    let kind = RequestKind::from_form(form);
    log::debug!("request: {:?}", kind);
    let worker = state.clone();
    let result = match web::block(move || render_page(&worker, kind)).await {
        Ok(result) => result,
        Err(e) => Err(anyhow::anyhow!("blocking task failed: {}", e)),
    };
    state.templates.to_response(result)
}

/// Renders the full HTML page for `kind`.
pub fn render_page(state: &AppState, kind: RequestKind) -> Result<String> {
    match kind {
        RequestKind::Home => home::render(state),
        RequestKind::Search(form) => search::render(state, &form),
        RequestKind::About => state.templates.render_page("about", "About", json!({})),
        RequestKind::StandardScore {
            music_title,
            difficulty,
            score,
            submitted,
        } => standard_score::render(state, &music_title, &difficulty, &score, submitted),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::import::tests::{csv_record, write_csv};
    use actix_web::{App, body, http::StatusCode, test};

    /// Application state over a small imported database.
    pub(crate) fn test_state() -> Result<(tempfile::TempDir, web::Data<AppState>)> {
        let dir = tempfile::tempdir()?;
        let csv = write_csv(
            dir.path(),
            &[
                csv_record("Lachryma", "EXHAUST", 17, 500, 5, 9_600_000.0, 200_000.0),
                csv_record("Lachryma", "EXCEED", 19, 200, 1, 9_100_000.0, 400_000.0),
                csv_record("No Data", "MAXIMUM", 18, 0, 0, 0.0, 0.0),
                csv_record("A&B <live>", "GRAVITY", 18, 1000, 0, 9_500_000.0, 300_000.0),
            ],
        )?;
        let db_path = dir.path().join("stats.db");
        crate::import::bootstrap(&db_path, &csv)?;
        let state = AppState {
            db: Database::new(db_path),
            templates: Templates::new(None)?,
        };
        Ok((dir, web::Data::new(state)))
    }

    async fn call(state: web::Data<AppState>, req: test::TestRequest) -> (StatusCode, String) {
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/", web::get().to(index_get))
                .route("/", web::post().to(index_post)),
        )
        .await;
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let bytes = body::to_bytes(resp.into_body()).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[actix_web::test]
    async fn home_shows_ranking() {
        let (_dir, state) = test_state().unwrap();
        let (status, html) = call(state, test::TestRequest::get().uri("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("RANK"));
        assert!(html.contains("<td class=\"rank\">1</td>"));
        // EXHAUST Lv.17 is not part of the ranking
        assert!(!html.contains("difficulty_EXHAUST\">EXHAUST"));
    }

    #[actix_web::test]
    async fn about_page() {
        let (_dir, state) = test_state().unwrap();
        let (status, html) = call(state, test::TestRequest::get().uri("/?about=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<h1>About</h1>"));
    }

    #[actix_web::test]
    async fn search_by_post() {
        let (_dir, state) = test_state().unwrap();
        let req = test::TestRequest::post().set_form([
            ("submit", "1"),
            ("format", "1"),
            ("per", "1"),
            ("level_filter", "19"),
            ("level_filter", "17"),
        ]);
        let (status, html) = call(state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("PUC (%)"));
        // 5 / 500 = 1.0%, 1 / 200 = 0.5%
        assert!(html.contains("<td class=\"achiever_rate_rare\">1.0</td>"));
        assert!(html.contains("<td class=\"achiever_rate_rare\">0.5</td>"));
        assert!(!html.contains("No Data"));
    }

    #[actix_web::test]
    async fn search_by_get_with_title_filter() {
        let (_dir, state) = test_state().unwrap();
        let uri = "/?submit=&format=0&music_title_filter=%3Clive%3E&artist_filter=";
        let (status, html) = call(state, test::TestRequest::get().uri(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("A&amp;B &lt;live&gt;"));
        assert!(!html.contains("Lachryma</a>"));
    }

    #[actix_web::test]
    async fn malformed_filter_is_rejected() {
        let (_dir, state) = test_state().unwrap();
        let uri = "/?submit=1&level_filter=abc";
        let (status, html) = call(state, test::TestRequest::get().uri(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("level_filter"));
        assert!(!html.contains("<td"));
    }
}
