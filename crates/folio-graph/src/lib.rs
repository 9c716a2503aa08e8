//! folio-graph — ownership-scoped Neo4j access layer.
//!
//! This crate is the single access point for the content graph. Every
//! read and write on Section/Publication/Event composes its traversal
//! from the caller's User node (`sub_id`) through the `OWNS` and
//! `CREATES_*` edges, so an entity outside the caller's ownership chain
//! is indistinguishable from one that does not exist.

pub mod client;
pub mod events;
pub mod publications;
pub mod sections;
pub mod users;

pub use client::{GraphClient, GraphConfig, GraphError};
