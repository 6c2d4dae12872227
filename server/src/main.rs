/// Class Portal Server - remote table backend
///
/// Main server entry point. Handles:
/// - Command-line argument parsing
/// - Database initialization
/// - HTTP server startup
use actix_web::web;
use anyhow::Context;
use class_portal_server::config::Config;
use class_portal_server::db;
use class_portal_server::handlers::ServerConfig;
use class_portal_server::server;
use std::fs;
use std::process;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let config = Config::from_args();

    log::info!("Starting Class Portal Server");
    log::info!("Database: {:?}", config.database);
    log::info!("Port: {}", config.port);
    log::info!(
        "API key: {}",
        if config.api_key.is_some() { "required" } else { "not required" }
    );

    // Write PID file if specified
    if let Some(pidfile) = &config.pidfile {
        let pid = process::id().to_string();
        fs::write(pidfile, pid)
            .with_context(|| format!("Failed to write PID file {:?}", pidfile))?;
        log::info!("PID file written to: {:?}", pidfile);
    }

    let db_path = config
        .database
        .to_str()
        .context("Database path is not valid UTF-8")?;
    let pool = db::create_pool(db_path).context("Failed to create database pool")?;

    log::info!("Database initialized");

    let pool_data = web::Data::new(pool);
    let server_config = web::Data::new(ServerConfig {
        api_key: config.api_key.clone(),
    });

    let bind_addr = format!("127.0.0.1:{}", config.port);
    log::info!("Starting HTTP server on {}", bind_addr);

    let http_server = server::create_http_server(pool_data, server_config, &bind_addr)?;
    http_server.await?;
    Ok(())
}
