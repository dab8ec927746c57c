use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

use directory_api::config::ApiConfig;
use directory_api::database::{CompanyStore, Database, SqliteCompanyStore};
use directory_api::handlers;
use directory_api::handlers::scrape::ScrapeAppState;
use directory_api::helpers;
use directory_api::jobs::directory_import_manager::DirectoryImportManager;
use directory_api::jobs::refresh_manager::RefreshManager;
use directory_scraper::{LlmScrapeClient, ModelRegistry, PageFetcher, ScrapeClient};

#[get("/health")]
async fn health(db: web::Data<Arc<Database>>) -> impl Responder {
    match db.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "status": "unhealthy",
                "database": "disconnected"
            }))
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    log_file_path: Option<String>,

    /// Path to api.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {e}"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = args.log_file_path {
        let log_path = std::path::Path::new(&log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("directory-api.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter.clone())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let (config, config_path) =
        ApiConfig::load(args.config).map_err(|e| startup_error("Failed to load config", e))?;
    tracing::info!("Loaded config from {:?}", config_path);

    let (db, db_path) = helpers::database::initialize_database(config.database_path())
        .map_err(|e| startup_error("Failed to initialize database", e))?;
    tracing::info!("Database initialized at: {:?}", db_path);

    let scraper_settings = config.scraper();
    let registry = ModelRegistry::new(
        config.ai_models.clone(),
        config.api_keys.clone().unwrap_or_default(),
    );
    for model in registry.describe().models.iter().filter(|m| !m.ready) {
        tracing::warn!("AI model {} has no API key configured", model.id);
    }

    let scraper: Arc<dyn ScrapeClient> = Arc::new(
        LlmScrapeClient::new(&scraper_settings, registry.clone())
            .map_err(|e| startup_error("Failed to create scrape client", e))?,
    );
    let store: Arc<dyn CompanyStore> =
        Arc::new(SqliteCompanyStore::new(db.async_connection.clone()));

    let refresh_manager = Arc::new(RefreshManager::new(
        store,
        scraper.clone(),
        config.default_actor(),
    ));

    let fetcher = PageFetcher::new(&scraper_settings)
        .map_err(|e| startup_error("Failed to create page fetcher", e))?;
    let directory_manager = Arc::new(DirectoryImportManager::new(
        db.async_connection.clone(),
        Arc::new(fetcher),
    ));

    let scrape_state = ScrapeAppState {
        scraper,
        registry: Arc::new(registry),
    };

    let server_config = config.server();
    let (host, port) = (server_config.host, server_config.port);
    tracing::info!("Starting server on {}:{}", host, port);

    let cors_config = config.cors.clone();
    let refresh_manager_for_server = refresh_manager.clone();
    let directory_manager_for_server = directory_manager.clone();
    let server = HttpServer::new(move || {
        let cors = if let Some(cors_config) = &cors_config {
            let mut cors_builder = Cors::default();
            for origin in &cors_config.allowed_origins {
                cors_builder = cors_builder.allowed_origin(origin);
            }
            cors_builder
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .max_age(3600)
        } else {
            Cors::default()
                .allow_any_origin()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(refresh_manager_for_server.clone()))
            .app_data(web::Data::new(directory_manager_for_server.clone()))
            .app_data(web::Data::new(scrape_state.clone()))
            .service(health)
            .route("/api/companies", web::get().to(handlers::companies::list_companies))
            .route("/api/companies", web::post().to(handlers::companies::create_company))
            .route("/api/companies/bulk-delete", web::post().to(handlers::companies::bulk_delete_companies))
            .route("/api/companies/check-duplicate", web::post().to(handlers::companies::check_duplicate))
            .route("/api/companies/{id}", web::get().to(handlers::companies::get_company))
            .route("/api/companies/{id}", web::put().to(handlers::companies::update_company))
            .route("/api/companies/{id}", web::delete().to(handlers::companies::delete_company))
            .route("/api/companies/{id}/refresh", web::post().to(handlers::refresh::refresh_company))
            .route("/api/refresh", web::post().to(handlers::refresh::start_refresh))
            .route("/api/refresh", web::get().to(handlers::refresh::get_refresh_state))
            .route("/api/refresh/cancel", web::post().to(handlers::refresh::cancel_refresh))
            .route("/api/scrape", web::post().to(handlers::scrape::scrape_url))
            .route("/api/ai-models", web::get().to(handlers::ai_models::list_ai_models))
            .route("/api/directory", web::post().to(handlers::directory::start_directory_import))
            .route("/api/directory/status", web::get().to(handlers::directory::get_directory_status))
            .route("/api/directory/cancel", web::post().to(handlers::directory::cancel_directory_import))
    })
    .bind((host.as_str(), port))?
    .run();

    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }

        tracing::info!("Ctrl+C received, shutting down...");
        refresh_manager.cancel().await;
        directory_manager.cancel().await;

        handle.stop(true).await;
    });

    server.await
}
