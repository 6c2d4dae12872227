//! Common test utilities and helpers for integration tests
//! Provides on-disk stores and a running backend for end-to-end sync tests

#![allow(dead_code)]

use class_portal::cloud::{CloudConfig, CloudSync};
use class_portal::storage::LocalStore;
use class_portal_server::handlers::ServerConfig;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Test context holding file-backed storage and its temporary directory
pub struct TestContext {
    pub store: LocalStore,
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalStore::new(temp_dir.path().join("portal.db")).expect("Failed to open store");
        TestContext { store, temp_dir }
    }

    /// Reopen the same database file, as a restarted process would
    pub fn reopen(&self) -> LocalStore {
        LocalStore::new(self.temp_dir.path().join("portal.db")).expect("Failed to reopen store")
    }
}

/// Spawn a backend on an ephemeral port and return its base URL
pub async fn spawn_backend() -> String {
    spawn_backend_with_config(ServerConfig::default()).await
}

pub async fn spawn_backend_with_config(config: ServerConfig) -> String {
    let (server, addr) = class_portal_server::server::create_test_http_server_with_config(config)
        .expect("Failed to create test server");
    tokio::spawn(server);

    // Give server a moment to bind
    tokio::time::sleep(Duration::from_millis(100)).await;
    format!("http://{}", addr)
}

pub fn cloud_for(base_url: &str, api_key: &str) -> Arc<CloudSync> {
    let config = CloudConfig::new(base_url, api_key)
        .expect("valid url")
        .with_timeout(Duration::from_secs(5));
    Arc::new(CloudSync::new(Some(config)).expect("Failed to build cloud client"))
}

/// A URL nothing listens on
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{}", addr)
}
