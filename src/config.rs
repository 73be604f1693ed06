//! # Configuration
//!
//! Command-line options of the binaries. Bind address and port fall back to
//! the `BIND_ADDRESS` and `PORT` environment variables, the same variables
//! the deployment scripts already set.

use clap::Parser;
use std::env;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "www", about = "SDVX score statistics web server")]
pub struct ServerConfig {
    /// SQLite database file. Created from --csv when missing.
    #[arg(long, default_value = "sdvx_stats.db")]
    pub db: PathBuf,

    /// Statistics CSV used to bootstrap the database.
    #[arg(long, default_value = "sdvx_stats.csv")]
    pub csv: PathBuf,

    /// Directory whose *.hbs files override the built-in page templates.
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Directory served under /static.
    #[arg(long = "static-dir", default_value = "static")]
    pub static_dir: PathBuf,

    /// Address to bind [env: BIND_ADDRESS, default: 0.0.0.0]
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on [env: PORT, default: 8080]
    #[arg(long)]
    pub port: Option<u16>,

    /// Log level filter (error, warn, info, debug, trace).
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: log::LevelFilter,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        let address = self
            .bind
            .clone()
            .or_else(|| env::var("BIND_ADDRESS").ok())
            .unwrap_or_else(|| String::from("0.0.0.0"));
        let port = self
            .port
            .map(|p| p.to_string())
            .or_else(|| env::var("PORT").ok())
            .unwrap_or_else(|| String::from("8080"));
        format!("{}:{}", address, port)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "import_csv", about = "Import the statistics CSV into a SQLite database")]
pub struct ImportConfig {
    /// Statistics CSV (first line is a header).
    pub csv: PathBuf,

    /// Destination database file.
    #[arg(long, default_value = "sdvx_stats.db")]
    pub db: PathBuf,

    /// Delete an existing database before importing.
    #[arg(long)]
    pub replace: bool,

    #[arg(long = "log-level", default_value = "info")]
    pub log_level: log::LevelFilter,
}

/// Initializes terminal logging at `level`.
pub fn init_logging(level: log::LevelFilter) {
    let mut builder = colog::default_builder();
    builder.filter(None, level);
    builder.init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_defaults() {
        let c = ServerConfig::parse_from(["www"]);
        assert_eq!(c.db, PathBuf::from("sdvx_stats.db"));
        assert_eq!(c.csv, PathBuf::from("sdvx_stats.csv"));
        assert_eq!(c.static_dir, PathBuf::from("static"));
        assert!(c.templates.is_none());
        assert_eq!(c.log_level, log::LevelFilter::Info);
    }

    #[test]
    fn explicit_bind_wins_over_env() {
        let c = ServerConfig::parse_from(["www", "--bind", "127.0.0.1", "--port", "9000"]);
        assert_eq!(c.bind_address(), "127.0.0.1:9000");
    }

    #[test]
    fn import_options() {
        let c = ImportConfig::parse_from(["import_csv", "stats.csv", "--replace", "--db", "x.db"]);
        assert_eq!(c.csv, PathBuf::from("stats.csv"));
        assert_eq!(c.db, PathBuf::from("x.db"));
        assert!(c.replace);
    }
}
