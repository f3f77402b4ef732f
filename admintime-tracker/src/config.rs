use std::env::var;

use dotenvy::dotenv;

/// Tracker configuration with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// Ledger connection string (SQLite path or URI)
    /// Env: DATABASE_URL (default: "admin_time.db")
    /// An empty value is rejected when the ledger is opened
    pub database_url: String,

    /// Identifies this server instance in every ledger row
    /// Env: SERVER_ID (default: "1")
    pub server_id: String,

    /// JSON file mapping admin identity to display name
    /// Env: ADMINS_PATH (default: "admins.json")
    pub admins_path: String,

    /// Max ledger writes waiting to be applied before new ones are dropped
    /// Env: WRITE_QUEUE_CAPACITY (default: 1024)
    pub write_queue_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let _ = dotenv(); //for local runs mostly
        Self {
            database_url: env_or_default_string("DATABASE_URL", "admin_time.db"),
            server_id: env_or_default_string("SERVER_ID", "1"),
            admins_path: env_or_default_string("ADMINS_PATH", "admins.json"),
            write_queue_capacity: env_or_default("WRITE_QUEUE_CAPACITY", 1024),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "admin_time.db".to_string(),
            server_id: "1".to_string(),
            admins_path: "admins.json".to_string(),
            write_queue_capacity: 1024,
        }
    }
}

/// Parse environment variable or return default value
fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key)
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable string or return default value
fn env_or_default_string(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|_| default.to_string())
}
