//! The server's bind address, port, and dictionary path — settable on the
//! command line and, optionally, overlaid from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub dictionary: String,
    pub max_players: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            dictionary: String::new(),
            max_players: wordbase_engine::MAX_SEATED as u8,
        }
    }
}

/// A JSON overlay read from disk; any field present replaces the default or
/// CLI-supplied value. A plain `serde_json::from_str` with no partial-merge
/// layer, since the whole overlay is small enough to just replace.
pub fn load_overlay(path: impl AsRef<Path>) -> Result<ServerConfig, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse JSON: {}", e))
}
