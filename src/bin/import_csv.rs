use anyhow::{Context, Result};
use clap::Parser;
use sdvx_stats::config::{ImportConfig, init_logging};
use sdvx_stats::import;

fn main() -> Result<()> {
    let config = ImportConfig::parse();
    init_logging(config.log_level);

    if config.replace && config.db.exists() {
        log::info!("Removing {}", config.db.display());
        std::fs::remove_file(&config.db)
            .with_context(|| format!("Failed to remove {}", config.db.display()))?;
    }
    match import::bootstrap(&config.db, &config.csv)? {
        Some(n) => println!("Imported {} rows into {}", n, config.db.display()),
        None => println!(
            "{} already exists; pass --replace to import again",
            config.db.display()
        ),
    }
    Ok(())
}
