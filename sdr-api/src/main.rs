use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use sdr_core::{CoreOptions, EngagementCore, HttpServiceGateway, KeyValueStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::prelude::*;

use sdr_api::config::ApiConfig;
use sdr_api::database::email_records;
use sdr_api::helpers;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    log_file_path: Option<String>,

    /// Config file to use instead of the per-user default
    #[arg(long)]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = args.log_file_path {
        let log_path = std::path::Path::new(&log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("sdr-api.log")),
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

    // Load config
    let (config, config_path) = ApiConfig::load(args.config).context("Failed to load config")?;
    tracing::info!("Using config at {:?}", config_path);

    let data_dir = config.data_dir();
    let db = helpers::database::initialize_database(&data_dir)
        .context("Failed to initialize database")?;
    let store = helpers::database::open_cache_store(config.redis_url().as_deref(), &data_dir)
        .await
        .context("Failed to open cache store")?;
    tracing::info!("Data directory: {:?}", data_dir);

    let services = config.services();
    let gateway = HttpServiceGateway::new(
        &services.api_url,
        Duration::from_secs(services.request_timeout_secs),
    )
    .context("Failed to build service client")?
    .with_service_token(services.service_token.clone());
    tracing::info!("Engagement services at {}", gateway.base_url());

    let options = CoreOptions {
        timezone: config.calendar_timezone().context("Invalid calendar config")?,
        calendar_max_results: config.calendar_max_results(),
    };
    let core = Arc::new(EngagementCore::new(
        Arc::new(gateway),
        store.clone(),
        options,
    ));

    // Restore outbound history and the cached snapshots before serving
    let history = email_records::list_emails(db.async_connection.clone())
        .await
        .context("Failed to load email records")?;
    core.emails.load_history(history).await;
    core.warm_from_cache().await;

    let bootstrap_core = core.clone();
    tokio::spawn(async move {
        if let Err(e) = bootstrap_core.meetings.bootstrap().await {
            tracing::warn!("Failed to load meetings on startup: {}", e);
        }
    });

    let server_config = config.server();
    let (host, port) = (server_config.host, server_config.port);
    tracing::info!("Server will listen on {}:{}", host, port);

    let cors_config = config.cors.clone();
    let db_for_server = db.clone();
    let store_for_server = store.clone();
    let server = HttpServer::new(move || {
        // Configure CORS
        let cors = if let Some(cors_config) = &cors_config {
            let mut cors_builder = Cors::default();
            for origin in &cors_config.allowed_origins {
                cors_builder = cors_builder.allowed_origin(origin);
            }
            cors_builder
                .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .max_age(3600)
        } else {
            Cors::default()
                .allow_any_origin()
                .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(db_for_server.clone()))
            .app_data(web::Data::new(store_for_server.clone()))
            .app_data(web::Data::new(core.clone()))
            .configure(sdr_api::configure_routes)
    })
    .bind((host.as_str(), port))?
    .run();

    let handle = server.handle();
    let shutdown_store = store.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }

        tracing::info!("Ctrl+C received, shutting down...");
        handle.stop(true).await;
        shutdown_store.close();
    });

    server.await?;
    store.close();
    Ok(())
}
