//! # CSV Bootstrap Import
//!
//! Creates the `sdvx_stats` table from the published statistics CSV the first
//! time the server starts. The CSV carries one header line followed by one
//! record per chart, with fields in the canonical column order.

use crate::columns::{self, TABLE_NAME};
use anyhow::{Context, Result};
use itertools::Itertools;
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// Imports `csv_path` into a new database at `db_path` unless the database already exists.
///
/// # Returns
/// `Some(n)` with the number of imported rows, or `None` if the database was already there.
pub fn bootstrap(db_path: &Path, csv_path: &Path) -> Result<Option<usize>> {
    if db_path.exists() {
        log::info!("Using existing database {}", db_path.display());
        return Ok(None);
    }
    log::info!(
        "Database {} not found; importing {}",
        db_path.display(),
        csv_path.display()
    );
    let result = import_csv(db_path, csv_path);
    if result.is_err() {
        // Leave nothing behind, so the next start retries the import.
        let _ = std::fs::remove_file(db_path);
    }
    result.map(Some)
}

/// Creates the table in `db_path` and fills it from `csv_path`.
pub fn import_csv(db_path: &Path, csv_path: &Path) -> Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open {}", csv_path.display()))?;

    let mut conn = Connection::open(db_path)
        .with_context(|| format!("Failed to create {}", db_path.display()))?;
    let tx = conn.transaction()?;
    tx.execute(&create_table_sql(), [])?;

    let expected = columns::all_columns().len();
    let mut imported = 0;
    {
        let mut stmt = tx.prepare(&insert_sql())?;
        for record in reader.records() {
            let record = record.context("Failed to read CSV record")?;
            if record.len() != expected {
                return Err(ImportError::FieldCount {
                    line: record.position().map_or(0, |p| p.line()),
                    expected,
                    found: record.len(),
                }
                .into());
            }
            let values = record.iter().map(|field| match field.trim() {
                "" => Value::Null,
                s => Value::Text(s.to_string()),
            });
            stmt.execute(params_from_iter(values))?;
            imported += 1;
        }
    }
    tx.commit()?;
    log::info!("Imported {} rows into {}", imported, TABLE_NAME);
    Ok(imported)
}

/// Column affinity converts numeric text to INTEGER/REAL on insert.
fn create_table_sql() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        TABLE_NAME,
        columns::all_columns()
            .iter()
            .map(|c| format!("{} {}", c.key, c.sql_type.as_sql()))
            .join(", ")
    )
}

fn insert_sql() -> String {
    let all = columns::all_columns();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        TABLE_NAME,
        all.iter().map(|c| c.key).join(", "),
        vec!["?"; all.len()].join(",")
    )
}
