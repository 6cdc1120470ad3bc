//! Configuration module for the Workbench backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the whole API (the identity gateway holds it)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Path to Tantivy search index directory
    pub index_path: PathBuf,
    /// Path to the JSON file holding each user's active project
    pub state_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("IDE_API_PSK").ok();

        let db_path = env::var("IDE_DB_PATH")
            .unwrap_or_else(|_| "./data/workbench.sqlite".to_string())
            .into();

        let index_path = env::var("IDE_INDEX_PATH")
            .unwrap_or_else(|_| "./data/index".to_string())
            .into();

        let state_path = env::var("IDE_STATE_PATH")
            .unwrap_or_else(|_| "./data/active_projects.json".to_string())
            .into();

        let bind_addr = env::var("IDE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid IDE_BIND_ADDR format");

        let log_level = env::var("IDE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            api_psk,
            db_path,
            index_path,
            state_path,
            bind_addr,
            log_level,
        }
    }
}
