//! Configuration loading for the resolver binary.
//!
//! Neo4j settings come from an optional `folio.toml` plus `FOLIO__`
//! environment variables (e.g. `FOLIO__NEO4J__URI`). In a deployed
//! environment the same three values are delivered out-of-band from the
//! parameter store (`/{env}/folio/neo4j_*`); this loader only cares
//! that they are present by the time the process connects.

use folio_graph::GraphConfig;

/// Build a `GraphConfig` from `<file_prefix>.toml` and the environment,
/// falling back to development defaults.
pub fn load_graph_config(file_prefix: &str) -> GraphConfig {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("FOLIO")
                .separator("__")
                .try_parsing(true),
        )
        .build();

    match cfg {
        Ok(c) => GraphConfig {
            uri: c
                .get_string("neo4j.uri")
                .unwrap_or_else(|_| "bolt://localhost:7687".to_string()),
            user: c
                .get_string("neo4j.user")
                .unwrap_or_else(|_| "neo4j".to_string()),
            password: c
                .get_string("neo4j.password")
                .unwrap_or_else(|_| "folio-dev".to_string()),
            ..Default::default()
        },
        Err(_) => GraphConfig::default(),
    }
}
