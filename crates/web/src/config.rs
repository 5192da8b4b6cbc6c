//! Server configuration from the environment

use std::env;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DB: &str = "board_oracle.db";
const DEFAULT_STATIC_DIR: &str = "crates/web/static";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub db_path: String,
    pub static_dir: String,
}

impl ServerConfig {
    /// Reads `BOARD_ORACLE_ADDR`, `BOARD_ORACLE_DB` and `BOARD_ORACLE_STATIC`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            addr: get("BOARD_ORACLE_ADDR", DEFAULT_ADDR),
            db_path: get("BOARD_ORACLE_DB", DEFAULT_DB),
            static_dir: get("BOARD_ORACLE_STATIC", DEFAULT_STATIC_DIR),
        }
    }
}
