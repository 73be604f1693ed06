use actix_files::Files;
use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use clap::Parser;
use sdvx_stats::config::{ServerConfig, init_logging};
use sdvx_stats::import;
use sdvx_stats::sql::Database;
use sdvx_stats::www::handlers::{self, AppState, template::Templates};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(config.log_level);

    import::bootstrap(&config.db, &config.csv).context("Failed to initialize the database")?;

    let state = web::Data::new(AppState {
        db: Database::new(&config.db),
        templates: Templates::new(config.templates.as_deref())?,
    });
    let bind_address = config.bind_address();
    let static_dir = config.static_dir.clone();

    log::info!("Starting server at: http://{}/", bind_address);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .route("/", web::get().to(handlers::index_get))
            .route("/", web::post().to(handlers::index_post))
            .service(Files::new("/static", &static_dir))
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await?;
    Ok(())
}
