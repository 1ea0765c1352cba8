//! Configuration for the taggraph HTTP service.

use serde::Deserialize;

use taggraph_graph::GraphConfig;
use taggraph_recommend::DEFAULT_LIMIT;

/// Top-level service configuration.
///
/// Loaded from `taggraph.toml` or `TAGGRAPH__` environment variables
/// (e.g. `TAGGRAPH__NEO4J__URI`). Every field has a default, so a missing
/// file is not an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub neo4j: Neo4jSection,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Recommendations returned when a request omits `limit`.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

/// Which graph store backs the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local graph; contents are lost on restart.
    #[default]
    Memory,
    Neo4j,
}

/// Neo4j connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSection {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

impl Neo4jSection {
    pub fn graph_config(&self) -> GraphConfig {
        GraphConfig {
            uri: self.uri.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            max_connections: self.max_connections,
            fetch_size: self.fetch_size,
        }
    }
}

impl ServiceConfig {
    /// Layer the optional config file under environment overrides.
    pub fn load(file_prefix: &str) -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("TAGGRAPH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        cfg.try_deserialize()
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_uri() -> String {
    GraphConfig::default().uri
}

fn default_user() -> String {
    GraphConfig::default().user
}

fn default_password() -> String {
    GraphConfig::default().password
}

fn default_max_connections() -> u32 {
    GraphConfig::default().max_connections
}

fn default_fetch_size() -> usize {
    GraphConfig::default().fetch_size
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            default_limit: default_limit(),
        }
    }
}

impl Default for Neo4jSection {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> ServiceConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1:5000");
        assert_eq!(config.server.default_limit, 50);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = from_toml(
            r#"
            [store]
            backend = "neo4j"

            [neo4j]
            uri = "bolt://graph.internal:7687"
            "#,
        );
        assert_eq!(config.store.backend, StoreBackend::Neo4j);
        assert_eq!(config.neo4j.uri, "bolt://graph.internal:7687");
        assert_eq!(config.neo4j.user, "neo4j");
        assert_eq!(config.server.default_limit, 50);
    }

    #[test]
    fn test_graph_config_conversion() {
        let section = Neo4jSection {
            max_connections: 4,
            ..Default::default()
        };
        let graph = section.graph_config();
        assert_eq!(graph.max_connections, 4);
        assert_eq!(graph.fetch_size, 256);
    }
}
