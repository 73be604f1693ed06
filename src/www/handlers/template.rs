//! # HTML Templating and Response Helpers
//!
//! Pages are rendered with the `handlebars` crate in two steps: the page
//! template (`home`, `result`, `ss`, `about`) renders the page body, which is
//! then injected into the shared `main` layout through `{{{contents}}}`.
//!
//! The templates are compiled into the binary. When a template directory is
//! configured, any `<name>.hbs` found there replaces the built-in template of
//! the same name, so the pages can be restyled without a rebuild.

use crate::columns;
use crate::query::QueryError;
use crate::results::escape_html;
use actix_web::HttpResponse;
use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde_json::{Value, json};
use std::path::Path;

const BUILTIN_TEMPLATES: [(&str, &str); 6] = [
    ("main", include_str!("../../../templates/main.hbs")),
    ("search_form", include_str!("../../../templates/search_form.hbs")),
    ("home", include_str!("../../../templates/home.hbs")),
    ("result", include_str!("../../../templates/result.hbs")),
    ("ss", include_str!("../../../templates/ss.hbs")),
    ("about", include_str!("../../../templates/about.hbs")),
];

/// The page templates of the site.
pub struct Templates {
    engine: Handlebars<'static>,
}

impl Templates {
    /// Registers the built-in templates, then any overrides found in `dir`.
    pub fn new(dir: Option<&Path>) -> Result<Self> {
        let mut engine = Handlebars::new();
        for (name, source) in BUILTIN_TEMPLATES {
            let path = dir.map(|d| d.join(format!("{}.hbs", name)));
            match path {
                Some(path) if path.is_file() => {
                    log::info!("Template {} loaded from {}", name, path.display());
                    engine
                        .register_template_file(name, &path)
                        .with_context(|| format!("Invalid template {}", path.display()))?;
                }
                _ => engine
                    .register_template_string(name, source)
                    .with_context(|| format!("Invalid built-in template {}", name))?,
            }
        }
        Ok(Templates { engine })
    }

    /// Renders page template `name` with `data` (plus the search form data) inside the main layout.
    pub fn render_page(&self, name: &str, title: &str, mut data: Value) -> Result<String> {
        if let Value::Object(map) = &mut data {
            if let Value::Object(form) = search_form_data() {
                map.extend(form);
            }
        }
        let contents = self
            .engine
            .render(name, &data)
            .with_context(|| format!("Failed to render {}", name))?;
        self.render(title, &contents)
    }

    /// Renders the given content string into the main HTML layout.
    pub fn render(&self, title: &str, contents: &str) -> Result<String> {
        self.engine
            .render("main", &json!({ "title": title, "contents": contents }))
            .context("Failed to render layout")
    }

    /// Creates an HTML response for displaying an `anyhow::Error`.
    ///
    /// Rejected form input becomes a 400 page with the reason; anything else is
    /// a 500 page with the error chain in a `<pre>` block.
    pub fn to_error_response(&self, error: &anyhow::Error) -> HttpResponse {
        if let Some(e @ QueryError::InvalidFilterValue { .. }) = error.downcast_ref::<QueryError>() {
            log::warn!("Rejected request: {}", e);
            let body = format!("<h2>入力エラー</h2>\n<p>{}</p>", escape_html(&e.to_string()));
            return HttpResponse::BadRequest()
                .content_type("text/html; charset=utf-8")
                .body(self.render("入力エラー", &body).unwrap_or(body));
        }
        log::error!("{:?}", error);
        let body = format!(
            "<h1>エラー</h1><pre><code>{}</code></pre>",
            escape_html(&format!("{:?}", error))
        );
        HttpResponse::InternalServerError()
            .content_type("text/html; charset=utf-8")
            .body(self.render("エラー", &body).unwrap_or(body))
    }

    /// Converts a rendered page or an error into the matching response.
    pub fn to_response(&self, result: Result<String>) -> HttpResponse {
        match result {
            Ok(html) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(html),
            Err(e) => self.to_error_response(&e),
        }
    }
}

/// Checkbox lists of the search form, generated from the column ontology.
fn search_form_data() -> Value {
    json!({
        "display_columns": columns::display_columns()
            .iter()
            .map(|c| json!({ "key": c.key, "label": c.label }))
            .collect::<Vec<_>>(),
        "difficulties": columns::DIFFICULTIES
            .iter()
            .enumerate()
            .map(|(i, d)| json!({ "index": i, "name": d }))
            .collect::<Vec<_>>(),
        "levels": (1..=20).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_templates_render() -> Result<()> {
        let t = Templates::new(None)?;
        let html = t.render_page("about", "About", json!({}))?;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>About"));
        Ok(())
    }

    #[test]
    fn search_form_lists_the_ontology() -> Result<()> {
        let t = Templates::new(None)?;
        let html = t.render_page("result", "検索結果", json!({ "results_header": "", "results": "" }))?;
        assert!(html.contains("name=\"avg_vf_10_ii\""));
        assert!(html.contains("インペリアル2"));
        assert!(html.contains("name=\"difficulty\" value=\"8\""));
        assert!(html.contains("name=\"level_filter\" value=\"20\""));
        Ok(())
    }

    #[test]
    fn fragments_are_not_escaped() -> Result<()> {
        let t = Templates::new(None)?;
        let html = t.render_page(
            "result",
            "検索結果",
            json!({ "results_header": "<tr><th>x</th></tr>", "results": "" }),
        )?;
        assert!(html.contains("<tr><th>x</th></tr>"));
        Ok(())
    }

    #[test]
    fn directory_overrides_builtin() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("about.hbs"), "<p>custom about</p>")?;
        let t = Templates::new(Some(dir.path()))?;
        let html = t.render_page("about", "About", json!({}))?;
        assert!(html.contains("<p>custom about</p>"));
        // 上書きされていないテンプレートは組み込みのまま
        assert!(t.render_page("home", "Home", json!({}))?.contains("name=\"submit\""));
        Ok(())
    }

    #[test]
    fn invalid_filter_is_a_bad_request() {
        let t = Templates::new(None).unwrap();
        let err = anyhow::Error::from(QueryError::InvalidFilterValue {
            field: "level_filter",
            value: "abc".into(),
        });
        assert_eq!(t.to_error_response(&err).status(), 400);
        let err = anyhow::anyhow!("database is gone");
        assert_eq!(t.to_error_response(&err).status(), 500);
    }
}
