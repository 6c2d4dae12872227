/// HTTP server factory and configuration.
/// Provides a reusable function to create and configure the HTTP server
/// for use in both the main binary and tests.

use crate::db::DbPool;
use crate::handlers::{count_rows, health, list_rows, login, upsert_rows, ServerConfig};
use actix_web::{middleware, web, App, HttpServer};

/// Register every REST route on an app or test service
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/tables/{table}", web::get().to(list_rows))
        .route("/tables/{table}", web::post().to(upsert_rows))
        .route("/tables/{table}/count", web::get().to(count_rows))
        .route("/auth/login", web::post().to(login));
}

/// Create a configured HTTP server
///
/// # Arguments
/// * `pool` - Database connection pool wrapped in web::Data
/// * `config` - Shared handler settings (API key)
/// * `bind_addr` - Address to bind the server to (e.g., "127.0.0.1:4000")
pub fn create_http_server(
    pool: web::Data<DbPool>,
    config: web::Data<ServerConfig>,
    bind_addr: &str,
) -> std::io::Result<actix_web::dev::Server> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(config.clone())
            .app_data(web::JsonConfig::default().limit(16 * 1024 * 1024))
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}

/// Create a test HTTP server with an in-memory database
///
/// Binds to a random available port.
///
/// # Returns
/// A tuple of (server, bind_address) where bind_address can be used to make requests
#[cfg(any(test, feature = "test_utils"))]
pub fn create_test_http_server() -> std::io::Result<(actix_web::dev::Server, String)> {
    create_test_http_server_with_config(ServerConfig::default())
}

/// Same as [`create_test_http_server`] with explicit handler settings
#[cfg(any(test, feature = "test_utils"))]
pub fn create_test_http_server_with_config(
    config: ServerConfig,
) -> std::io::Result<(actix_web::dev::Server, String)> {
    let pool = web::Data::new(crate::db::create_test_pool());
    let config = web::Data::new(config);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(config.clone())
            .app_data(web::JsonConfig::default().limit(16 * 1024 * 1024))
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .workers(1)
    .bind("127.0.0.1:0")?;

    // Get the actual bind address (including the assigned port)
    let addr_str = server
        .addrs()
        .first()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "No bind address found"))?
        .to_string();

    Ok((server.run(), addr_str))
}
