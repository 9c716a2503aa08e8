//! Error types for the folio-resolver crate.

use thiserror::Error;

use folio_graph::GraphError;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Resolver not found: {parent_type}.{field}")]
    RoutingFailure { parent_type: String, field: String },

    #[error("Invalid arguments for {field}: {source}")]
    Arguments {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid id `{value}` for {field}")]
    InvalidId { field: String, value: String },

    #[error("Nested field {field} requires a parent source")]
    MissingSource { field: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, ResolverError>;
