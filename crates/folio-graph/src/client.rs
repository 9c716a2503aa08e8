//! Neo4j connection management and shared graph client.

use chrono::{DateTime, Utc};
use neo4rs::{ConfigBuilder, Graph, Query};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    /// Zero rows where exactly one was expected. The message does not
    /// distinguish "absent" from "outside the caller's ownership chain".
    #[error("{label} not found.")]
    NotFound { label: &'static str },

    /// A domain rule blocked the operation.
    #[error("{0}")]
    Constraint(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "folio-dev".to_string(),
            max_connections: 16,
            fetch_size: 256,
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// All content-graph reads and writes flow through this client.
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Create the schema objects the access layer relies on: the
    /// subject-id uniqueness constraint and the Publication full-text
    /// search index. Both are idempotent.
    pub async fn ensure_schema(&self) -> Result<(), GraphError> {
        self.run(neo4rs::query(
            "CREATE CONSTRAINT user_sub_id_unique IF NOT EXISTS
             FOR (user:User) REQUIRE user.sub_id IS UNIQUE",
        ))
        .await?;

        self.run(neo4rs::query(&format!(
            "CREATE FULLTEXT INDEX {} IF NOT EXISTS
             FOR (publication:Publication)
             ON EACH [publication.title, publication.subtitle, publication.tags]",
            crate::publications::SEARCH_INDEX
        )))
        .await?;

        tracing::info!("Graph schema ensured");
        Ok(())
    }

    /// Execute a write-only query (CREATE, MERGE, DELETE, SET).
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        self.graph.run(query).await?;
        Ok(())
    }

    /// Execute a read query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a read query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        Ok(stream.next().await?)
    }
}

// ── Row/node shaping helpers ─────────────────────────────────────

/// Read a required property from a node.
pub(crate) fn prop<'a, T: serde::Deserialize<'a>>(
    node: &'a neo4rs::Node,
    key: &str,
) -> Result<T, GraphError> {
    node.get::<T>(key)
        .map_err(|e| GraphError::Serialization(format!("failed to read `{key}`: {e}")))
}

/// Parse an RFC 3339 timestamp property.
pub(crate) fn timestamp(node: &neo4rs::Node, key: &str) -> Result<DateTime<Utc>, GraphError> {
    let raw: String = prop(node, key)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| GraphError::Serialization(format!("bad `{key}` timestamp: {e}")))
}

/// Parse an RFC 3339 timestamp property that may be absent.
pub(crate) fn opt_timestamp(
    node: &neo4rs::Node,
    key: &str,
) -> Result<Option<DateTime<Utc>>, GraphError> {
    match node.get::<String>(key) {
        Ok(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| GraphError::Serialization(format!("bad `{key}` timestamp: {e}"))),
        Err(_) => Ok(None),
    }
}
