//! # SQLite Database Wrapper
//!
//! A small, opinionated interface over `rusqlite` for the read-only statistics
//! database. Every call opens its own connection and drops it before
//! returning, so no connection outlives the request that needed it.
//!
//! Rows are fully materialized and keep the column names reported by SQLite,
//! which allows both positional and named access with readable error messages.

use anyhow::{Context, Result};
use rusqlite::types::{FromSql, Value, ValueRef};
use rusqlite::{Connection, OpenFlags, params_from_iter};
use std::path::PathBuf;
use std::sync::Arc;

/// Handle to the statistics database file. Cheap to clone; holds no connection.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Database { path: path.into() }
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database {}", self.path.display()))
    }

    /// Executes a query that is expected to return multiple rows.
    pub fn select(&self, query: &str, params: &[Value]) -> Result<Vec<Row>> {
        log::info!("SQL: {}", query);
        log::info!("params: {:?}", params);
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(query)
            .with_context(|| format!("Failed to prepare {}", query))?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let arity = columns.len();
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut result = vec![];
        while let Some(r) = rows.next()? {
            let values = (0..arity)
                .map(|i| r.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            result.push(Row {
                columns: columns.clone(),
                values,
            });
        }
        Ok(result)
    }

    /// Executes a query that is expected to return at most one row.
    pub fn row(&self, query: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.select(query, params)?.into_iter().next())
    }
}

/// One materialized result row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// The raw value at `idx`, if the row is that wide.
    pub fn value(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Gets an optional value from the row by column index.
    ///
    /// # Returns
    /// `Ok(Some(T))` if the value is not NULL.
    /// `Ok(None)` if the value is NULL.
    /// `Err` if the index is out of range or the value cannot be converted to `T`.
    pub fn at_option<T: FromSql>(&self, idx: usize) -> Result<Option<T>> {
        let value = self
            .values
            .get(idx)
            .ok_or_else(|| anyhow::anyhow!("Column #{} is out of range ({})", idx, self.len()))?;
        if *value == Value::Null {
            return Ok(None);
        }
        T::column_result(ValueRef::from(value))
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Error in column {} (#{}): {}", self.columns[idx], idx, e))
    }

    /// Gets a required value from the row by column index.
    pub fn at<T: FromSql>(&self, idx: usize) -> Result<T> {
        self.at_option(idx)?.ok_or_else(|| {
            anyhow::anyhow!(
                "Column {} (#{}) is unexpectedly null",
                self.columns[idx],
                idx
            )
        })
    }

    fn idx(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| anyhow::anyhow!("Column {} is not found", name))
    }

    /// Gets a required value from the row by column name.
    pub fn get<T: FromSql>(&self, name: &str) -> Result<T> {
        self.at(self.idx(name)?)
    }

    /// Gets an optional value from the row by column name.
    pub fn get_option<T: FromSql>(&self, name: &str) -> Result<Option<T>> {
        self.at_option(self.idx(name)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Creates a scratch database with a single table, returning the guard that owns its directory.
    pub(crate) fn scratch_db(setup: &str) -> Result<(TempDir, Database)> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("test.db");
        Connection::open(&path)?.execute_batch(setup)?;
        Ok((dir, Database::new(path)))
    }

    #[test]
    fn select_materializes_rows() -> Result<()> {
        let (_dir, db) = scratch_db(
            "CREATE TABLE t (a INTEGER, b TEXT, c REAL);
             INSERT INTO t VALUES (1, 'x', 0.5), (2, NULL, 1.5);",
        )?;
        let rows = db.select(
            "SELECT a, b, c FROM t WHERE a >= ? ORDER BY a",
            &[Value::Integer(1)],
        )?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0].at::<i64>(0)?, 1);
        assert_eq!(rows[0].get::<String>("b")?, "x");
        assert_eq!(rows[1].get_option::<String>("b")?, None);
        assert_eq!(rows[1].get::<f64>("c")?, 1.5);
        assert_eq!(rows[1].value(1), Some(&Value::Null));
        Ok(())
    }

    #[test]
    fn row_returns_first_or_none() -> Result<()> {
        let (_dir, db) = scratch_db("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (7);")?;
        let r = db.row("SELECT a FROM t", &[])?.expect("row should exist");
        assert_eq!(r.at::<i64>(0)?, 7);
        assert!(db.row("SELECT a FROM t WHERE a = ?", &[Value::Integer(0)])?.is_none());
        Ok(())
    }

    #[test]
    fn accessor_errors_name_the_column() -> Result<()> {
        let (_dir, db) = scratch_db("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (NULL);")?;
        let r = db.row("SELECT a FROM t", &[])?.expect("row should exist");
        let err = r.at::<i64>(0).unwrap_err().to_string();
        assert!(err.contains("a (#0) is unexpectedly null"), "{}", err);
        assert!(r.get::<i64>("zzz").is_err());
        assert!(r.at_option::<i64>(5).is_err());
        Ok(())
    }

    #[test]
    fn database_is_opened_read_only() -> Result<()> {
        let (_dir, db) = scratch_db("CREATE TABLE t (a INTEGER);")?;
        assert!(db.select("INSERT INTO t VALUES (1)", &[]).is_err());
        Ok(())
    }

    #[test]
    fn missing_database_is_an_error() {
        let db = Database::new("/nonexistent/dir/none.db");
        assert!(db.select("SELECT 1", &[]).is_err());
    }
}
