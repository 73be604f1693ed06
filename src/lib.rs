// # SDVX Stats: Score Statistics Browser
//
// This crate serves a SOUND VOLTEX score statistics database as HTML pages.
// Users filter charts by level, difficulty, title and artist, choose which
// statistics to show (as achiever counts or achievement rates), and compute
// the standard score of their own score on one chart.
//
// The web server lives behind the `actix-web` feature; everything else
// (column ontology, query building, rendering, import) is plain library code.

/// The registry of table columns, difficulties and filter fields.
pub mod columns;

/// Submitted form fields.
pub mod form;

/// Translation of search forms into parameterized SQL.
pub mod query;

/// SQLite access, one connection per call.
pub mod sql;

/// One-time CSV import of the statistics table.
pub mod import;

/// HTML rendering of result rows.
pub mod results;

/// Standard score calculation.
pub mod stats;

/// Command-line and environment configuration.
pub mod config;

/// WWW server implementation. Enabled with the `actix-web` and `actix-files` features.
#[cfg(all(feature = "actix-web", feature = "actix-files"))]
pub mod www;
