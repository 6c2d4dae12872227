/// REST API handlers for HTTP endpoints.
/// Handles table listing, upserts, counts, and the password check.

use super::ServerConfig;
use crate::db::{models::*, Database, DbPool, TableError};
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use serde_json::{json, Value};

/// Rejects the request unless it carries the configured API key
fn authorize(req: &HttpRequest, config: &ServerConfig) -> Option<HttpResponse> {
    let expected = config.api_key.as_deref()?;
    let provided = req
        .headers()
        .get("apikey")
        .and_then(|value| value.to_str().ok());

    if provided == Some(expected) {
        None
    } else {
        Some(HttpResponse::Unauthorized().json(json!({
            "error": "Invalid API key"
        })))
    }
}

fn table_error_response(table: &str, e: TableError) -> HttpResponse {
    match e {
        TableError::UnknownTable(_) => HttpResponse::NotFound().json(json!({
            "error": format!("Unknown table: {}", table)
        })),
        TableError::MissingId(index) => HttpResponse::BadRequest().json(json!({
            "error": format!("Row {} has no string id", index)
        })),
        other => {
            log::error!("Table {} operation failed: {}", table, other);
            HttpResponse::InternalServerError().json(json!({
                "error": "Table operation failed"
            }))
        }
    }
}

/// List every row of a table
/// GET /tables/:table
pub async fn list_rows(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    config: web::Data<ServerConfig>,
    table: web::Path<String>,
) -> ActixResult<HttpResponse> {
    if let Some(denied) = authorize(&req, &config) {
        return Ok(denied);
    }

    match Database::list_rows(&pool, &table).await {
        Ok(rows) => Ok(HttpResponse::Ok().json(rows)),
        Err(e) => Ok(table_error_response(&table, e)),
    }
}

/// Upsert one row (object body) or many rows (array body) by id
/// POST /tables/:table
pub async fn upsert_rows(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    config: web::Data<ServerConfig>,
    table: web::Path<String>,
    body: web::Json<Value>,
) -> ActixResult<HttpResponse> {
    if let Some(denied) = authorize(&req, &config) {
        return Ok(denied);
    }

    let rows = match body.into_inner() {
        Value::Array(rows) => rows,
        row @ Value::Object(_) => vec![row],
        _ => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Body must be a row object or an array of rows"
            })))
        }
    };

    match Database::upsert_rows(&pool, &table, &rows).await {
        Ok(upserted) => {
            log::debug!("Upserted {} rows into {}", upserted, table);
            Ok(HttpResponse::Ok().json(UpsertResponse { upserted }))
        }
        Err(e) => Ok(table_error_response(&table, e)),
    }
}

/// Row count of a table
/// GET /tables/:table/count
pub async fn count_rows(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    config: web::Data<ServerConfig>,
    table: web::Path<String>,
) -> ActixResult<HttpResponse> {
    if let Some(denied) = authorize(&req, &config) {
        return Ok(denied);
    }

    match Database::count_rows(&pool, &table).await {
        Ok(count) => Ok(HttpResponse::Ok().json(CountResponse { count })),
        Err(e) => Ok(table_error_response(&table, e)),
    }
}

/// Password-based identity check
/// POST /auth/login
pub async fn login(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    config: web::Data<ServerConfig>,
    body: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    if let Some(denied) = authorize(&req, &config) {
        return Ok(denied);
    }

    match Database::check_login(&pool, &body.username, &body.password).await {
        Ok(Some(user)) => {
            log::info!("Login accepted for {}", user.username);
            Ok(HttpResponse::Ok().json(user))
        }
        Ok(None) => Ok(HttpResponse::Unauthorized().json(json!({
            "error": "Invalid credentials"
        }))),
        Err(e) => Ok(table_error_response("users", e)),
    }
}

/// Health check endpoint
/// GET /health
pub async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok"
    })))
}
