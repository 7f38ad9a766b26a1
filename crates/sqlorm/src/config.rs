//! Server configuration loading and the named-server registry.
//!
//! Configuration is a JSON list of server entries. Loaded servers are
//! usually registered process-wide so call sites can look them up by logical
//! name instead of threading handles around.

use crate::dialect::Dialect;
use crate::error::{OrmError, OrmResult};
use crate::server::Server;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// One configured server entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Logical server name.
    pub name: String,
    /// Backend dialect (`"postgres"`, `"mysql"`, or `"sqlite"`).
    pub dialect: Dialect,
    /// Dialect-specific connection string.
    pub dsn: String,
}

impl From<ServerConfig> for Server {
    fn from(config: ServerConfig) -> Self {
        Server::new(config.name, config.dialect, config.dsn)
    }
}

/// Parse a JSON array of server entries.
pub fn load_servers(json: &str) -> OrmResult<Vec<Server>> {
    let configs: Vec<ServerConfig> = serde_json::from_str(json)
        .map_err(|e| OrmError::configuration(format!("invalid server configuration: {e}")))?;
    Ok(configs.into_iter().map(Server::from).collect())
}

/// Read and parse a JSON configuration file.
pub fn load_servers_file(path: impl AsRef<Path>) -> OrmResult<Vec<Server>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        OrmError::configuration(format!("cannot read {}: {e}", path.display()))
    })?;
    load_servers(&text)
}

/// Parse a JSON array of server entries and register each under its name.
pub fn init_servers(json: &str) -> OrmResult<Vec<Server>> {
    let servers = load_servers(json)?;
    for server in &servers {
        register_server(server.clone());
    }
    Ok(servers)
}

fn registry() -> &'static Mutex<HashMap<String, Server>> {
    static SERVERS: OnceLock<Mutex<HashMap<String, Server>>> = OnceLock::new();
    SERVERS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Register a server under its logical name, replacing any previous entry.
pub fn register_server(server: Server) {
    let mut map = registry().lock().unwrap();
    map.insert(server.name.clone(), server);
}

/// Look up a registered server by logical name.
pub fn server(name: &str) -> OrmResult<Server> {
    let map = registry().lock().unwrap();
    map.get(name)
        .cloned()
        .ok_or_else(|| OrmError::configuration(format!("unknown server {name:?}")))
}
