//! Neo4j backend: connection pool, statement helpers, and how driver
//! failures are classified for callers.

use std::fmt::Display;

use neo4rs::{query, ConfigBuilder, Graph, Query, Row};

use taggraph_core::{EdgeKind, NodeLabel, TagGraphError};

const DEFAULT_URI: &str = "bolt://localhost:7687";
const DEFAULT_USER: &str = "neo4j";
const DEFAULT_PASSWORD: &str = "taggraph-dev";

/// Failures raised by either graph backend.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The pool could not be built or the server refused the session.
    #[error("cannot reach Neo4j: {0}")]
    Connection(String),

    #[error("Cypher statement failed: {0}")]
    Query(#[from] neo4rs::Error),

    /// A row came back in a shape the reader did not expect.
    #[error("unreadable result row: {0}")]
    Serialization(String),

    #[error("{kind} edge needs {label} {id}, which does not exist")]
    EndpointNotFound {
        kind: EdgeKind,
        label: NodeLabel,
        id: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<GraphError> for TagGraphError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::EndpointNotFound { kind, label, id } => {
                TagGraphError::EndpointNotFound { kind, label, id }
            }
            GraphError::InvalidArgument(msg) => TagGraphError::InvalidArgument(msg),
            // Nothing the driver reports says an entity is absent.
            GraphError::Connection(_) | GraphError::Query(_) | GraphError::Serialization(_) => {
                TagGraphError::StoreUnavailable(err.to_string())
            }
        }
    }
}

fn connection_error(e: impl Display) -> GraphError {
    GraphError::Connection(e.to_string())
}

/// Where and how to open the Bolt connection pool.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    /// Upper bound on pooled Bolt sessions.
    pub max_connections: u32,
    /// Records pulled per round trip when streaming results.
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            max_connections: 16,
            fetch_size: 256,
        }
    }
}

/// Pooled handle to a Neo4j server. Cloning shares the pool.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let bolt = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(connection_error)?;

        let graph = Graph::connect(bolt).await.map_err(connection_error)?;

        tracing::info!(
            uri = %config.uri,
            max_connections = config.max_connections,
            "Neo4j pool ready"
        );
        Ok(Self { graph })
    }

    /// Run a statement whose result rows are not needed.
    pub async fn run(&self, statement: Query) -> Result<(), GraphError> {
        Ok(self.graph.run(statement).await?)
    }

    /// Run a statement and buffer every row it yields.
    pub async fn query_rows(&self, statement: Query) -> Result<Vec<Row>, GraphError> {
        let mut stream = self.graph.execute(statement).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        tracing::trace!(rows = rows.len(), "Statement drained");
        Ok(rows)
    }

    /// Run a statement and keep only its first row.
    pub async fn query_one(&self, statement: Query) -> Result<Option<Row>, GraphError> {
        let mut stream = self.graph.execute(statement).await?;
        Ok(stream.next().await?)
    }

    /// Round-trip a trivial statement to confirm the server is reachable.
    pub async fn ping(&self) -> Result<(), GraphError> {
        self.query_one(query("RETURN 1 AS ok")).await?;
        Ok(())
    }

    /// Create one uniqueness constraint per label so concurrent MERGE
    /// calls can never produce two nodes with the same id.
    pub async fn ensure_schema(&self) -> Result<(), GraphError> {
        for label in NodeLabel::ALL {
            let cypher = format!(
                "CREATE CONSTRAINT {prop}_unique IF NOT EXISTS
                 FOR (n:{label}) REQUIRE n.{prop} IS UNIQUE",
                label = label.as_str(),
                prop = label.id_property(),
            );
            self.run(query(&cypher)).await?;
        }
        tracing::info!("Neo4j uniqueness constraints in place");
        Ok(())
    }
}
