/// HTTP handlers module
/// Provides the REST table endpoints

pub mod rest;

pub use rest::{count_rows, health, list_rows, login, upsert_rows};

/// Runtime settings shared with every handler
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub api_key: Option<String>,
}
