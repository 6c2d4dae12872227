//! Cloud sync client for the remote table backend
//!
//! Every public operation is best-effort: failures are logged, recorded in
//! `last_error`, and turned into an empty/zero/`None` answer. The `try_*`
//! variants expose the failure for callers that must tell "empty" from "failed".

use crate::error::{PortalError, Result};
use crate::models::Collection;
use futures::future::join_all;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const NOT_CONFIGURED: &str = "cloud sync is not configured";

/// Connection settings for the remote backend
#[derive(Debug, Clone)]
pub struct CloudConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl CloudConfig {
    /// Validate the base URL and build a config with the default timeout
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| PortalError::Config(format!("Invalid remote URL {}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PortalError::Config(format!(
                "Remote URL must be http or https: {}",
                base_url
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Outcome of a connectivity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PingStatus {
    NotConfigured,
    Reachable,
    Failed(String),
}

impl fmt::Display for PingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PingStatus::NotConfigured => f.write_str(NOT_CONFIGURED),
            PingStatus::Reachable => f.write_str("remote backend reachable"),
            PingStatus::Failed(e) => write!(f, "remote call failed: {}", e),
        }
    }
}

/// Identity confirmed by the remote password check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub name: String,
    pub role: String,
}

/// Advisory session flag; never gates data operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthStatus {
    pub logged_in: bool,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct UpsertResponse {
    upserted: usize,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

struct Remote {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Remote mirror client. Disabled when constructed without a config.
pub struct CloudSync {
    remote: Option<Remote>,
    last_error: Mutex<Option<String>>,
    session: Mutex<Option<AuthUser>>,
}

impl CloudSync {
    /// Create a client; `None` yields a permanently disabled client
    pub fn new(config: Option<CloudConfig>) -> Result<Self> {
        let remote = match config {
            Some(config) => {
                let client = Client::builder()
                    .timeout(config.timeout)
                    .build()
                    .map_err(|e| PortalError::Config(format!("Failed to create HTTP client: {}", e)))?;
                Some(Remote {
                    client,
                    base_url: config.base_url,
                    api_key: config.api_key,
                })
            }
            None => None,
        };

        Ok(Self {
            remote,
            last_error: Mutex::new(None),
            session: Mutex::new(None),
        })
    }

    pub fn disabled() -> Self {
        Self {
            remote: None,
            last_error: Mutex::new(None),
            session: Mutex::new(None),
        }
    }

    pub fn enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Most recent failure message from any remote call
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|guard| guard.clone())
    }

    pub(crate) fn record_error(&self, context: &str, e: &PortalError) {
        let message = format!("{}: {}", context, e);
        log::warn!("Cloud sync error: {}", message);
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = Some(message);
        }
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| PortalError::Config(NOT_CONFIGURED.to_string()))?;

        Ok(remote
            .client
            .request(method, format!("{}{}", remote.base_url, path))
            .header("apikey", &remote.api_key)
            .bearer_auth(&remote.api_key))
    }

    /// Fetch every row of a table, reporting failures
    pub async fn try_list(&self, table: Collection) -> Result<Vec<Value>> {
        let response = self
            .request(Method::GET, &format!("/tables/{}", table))?
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PortalError::ServerError(format!(
                "Failed to list {}: {}",
                table,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Fetch every row of a table; empty on any failure
    pub async fn list(&self, table: Collection) -> Vec<Value> {
        if !self.enabled() {
            return Vec::new();
        }

        match self.try_list(table).await {
            Ok(rows) => rows,
            Err(e) => {
                self.record_error(&format!("list {}", table), &e);
                Vec::new()
            }
        }
    }

    async fn post_rows<B: Serialize + ?Sized>(&self, table: Collection, body: &B) -> Result<usize> {
        let response = self
            .request(Method::POST, &format!("/tables/{}", table))?
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PortalError::ServerError(format!(
                "Upsert into {} failed: {}",
                table,
                response.status()
            )));
        }

        let parsed: UpsertResponse = response.json().await?;
        Ok(parsed.upserted)
    }

    /// Insert or replace one row by id, reporting failures
    pub async fn try_upsert(&self, table: Collection, row: &Value) -> Result<()> {
        self.post_rows(table, row).await.map(|_| ())
    }

    /// Insert or replace one row by id. Failures are only recorded.
    pub async fn upsert(&self, table: Collection, row: &Value) {
        if !self.enabled() {
            return;
        }

        if let Err(e) = self.try_upsert(table, row).await {
            self.record_error(&format!("upsert {}", table), &e);
        }
    }

    /// Insert or replace many rows by id, reporting failures. Empty input sends nothing.
    pub async fn try_bulk_upsert(&self, table: Collection, rows: &[Value]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        self.post_rows(table, rows).await
    }

    /// Insert or replace many rows by id. Failures are only recorded.
    pub async fn bulk_upsert(&self, table: Collection, rows: &[Value]) {
        if !self.enabled() || rows.is_empty() {
            return;
        }

        if let Err(e) = self.try_bulk_upsert(table, rows).await {
            self.record_error(&format!("bulk upsert {}", table), &e);
        }
    }

    pub async fn try_count(&self, table: Collection) -> Result<u64> {
        let response = self
            .request(Method::GET, &format!("/tables/{}/count", table))?
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PortalError::ServerError(format!(
                "Failed to count {}: {}",
                table,
                response.status()
            )));
        }

        let parsed: CountResponse = response.json().await?;
        Ok(parsed.count)
    }

    /// Row count of a table; zero on any failure
    pub async fn count(&self, table: Collection) -> u64 {
        if !self.enabled() {
            return 0;
        }

        match self.try_count(table).await {
            Ok(count) => count,
            Err(e) => {
                self.record_error(&format!("count {}", table), &e);
                0
            }
        }
    }

    /// Row counts of every table, queried concurrently
    pub async fn status(&self) -> Vec<(Collection, u64)> {
        let counts = join_all(Collection::ALL.iter().map(|table| self.count(*table))).await;
        Collection::ALL.into_iter().zip(counts).collect()
    }

    async fn try_health(&self) -> Result<()> {
        let response = self.request(Method::GET, "/health")?.send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(PortalError::ServerError(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<AuthUser> {
        let response = self
            .request(Method::POST, "/auth/login")?
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<AuthUser>().await?),
            StatusCode::UNAUTHORIZED => Err(PortalError::InvalidCredentials),
            status => Err(PortalError::ServerError(format!("Login failed: {}", status))),
        }
    }

    /// Probe the backend's health endpoint
    pub async fn ping(&self) -> PingStatus {
        if !self.enabled() {
            return PingStatus::NotConfigured;
        }

        match self.try_health().await {
            Ok(()) => PingStatus::Reachable,
            Err(e) => {
                self.record_error("ping", &e);
                PingStatus::Failed(e.to_string())
            }
        }
    }

    /// Password check against the remote identity provider.
    /// A successful login marks the session as logged in.
    pub async fn login(&self, username: &str, password: &str) -> Option<AuthUser> {
        if !self.enabled() {
            self.record_error("login", &PortalError::Config(NOT_CONFIGURED.to_string()));
            return None;
        }

        match self.try_login(username, password).await {
            Ok(user) => {
                log::info!("Remote login succeeded for {}", user.username);
                if let Ok(mut guard) = self.session.lock() {
                    *guard = Some(user.clone());
                }
                Some(user)
            }
            Err(e) => {
                self.record_error("login", &e);
                None
            }
        }
    }

    pub fn logout(&self) {
        if let Ok(mut guard) = self.session.lock() {
            *guard = None;
        }
    }

    pub fn auth_user(&self) -> Option<AuthUser> {
        self.session.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn auth_status(&self) -> AuthStatus {
        AuthStatus {
            logged_in: self.auth_user().is_some(),
        }
    }
}
