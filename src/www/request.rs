//! Resolution of a submitted form into the page it asks for.
//!
//! The site has a single URL; which page is served depends on which fields
//! the form carries. The decision is made once here and everything
//! downstream matches on [`RequestKind`].

use crate::form::FormData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Standard-score calculator for one song (`ss_music` present).
    StandardScore {
        music_title: String,
        /// Comma-joined difficulty indices or names.
        difficulty: String,
        score: String,
        /// Whether the calculator form itself was submitted.
        submitted: bool,
    },
    /// Filtered search results (`submit` present).
    Search(FormData),
    /// About page (`about` present).
    About,
    /// Home page with the average score ranking.
    Home,
}

impl RequestKind {
    pub fn from_form(form: FormData) -> Self {
        if let Some(title) = form.get("ss_music") {
            RequestKind::StandardScore {
                music_title: title.to_string(),
                difficulty: form.get("ss_difficulty").unwrap_or_default().to_string(),
                score: form.get("ss_score").unwrap_or_default().to_string(),
                submitted: form.contains("submit"),
            }
        } else if form.contains("submit") {
            RequestKind::Search(form)
        } else if form.contains("about") {
            RequestKind::About
        } else {
            RequestKind::Home
        }
    }
}
