/// Configuration management for the class portal backend.
/// Handles command-line argument parsing and config structure.
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "Class Portal Server")]
#[command(about = "Remote table backend for class portal sync", long_about = None)]
pub struct Config {
    /// Server port (default: 4000)
    #[arg(long, default_value = "4000")]
    pub port: u16,

    /// SQLite database file path (default: portal-remote.db)
    #[arg(long, default_value = "portal-remote.db")]
    pub database: PathBuf,

    /// API key clients must send in the `apikey` header (optional)
    #[arg(long)]
    pub api_key: Option<String>,

    /// PID file path (optional) - write server PID to this file on startup
    #[arg(long)]
    pub pidfile: Option<PathBuf>,
}

impl Config {
    /// Parse command-line arguments into Config
    pub fn from_args() -> Self {
        Config::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["class-portal-server"]);
        assert_eq!(config.port, 4000);
        assert_eq!(config.database.to_str().unwrap(), "portal-remote.db");
        assert!(config.api_key.is_none());
        assert!(config.pidfile.is_none());
    }

    #[test]
    fn test_custom_values() {
        let config = Config::parse_from([
            "class-portal-server",
            "--port",
            "8080",
            "--database",
            "/tmp/custom.db",
            "--api-key",
            "anon-key",
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.database.to_str().unwrap(), "/tmp/custom.db");
        assert_eq!(config.api_key.as_deref(), Some("anon-key"));
    }
}
