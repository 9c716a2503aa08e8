//! folio-resolver — field-resolution entry point for the Folio backend.
//!
//! An inbound event names a GraphQL field (`parentTypeName` +
//! `fieldName`) and carries the caller's identity claims. The dispatcher
//! maps the field to a repository operation in folio-graph, decodes the
//! arguments into typed inputs, and shapes the result back to JSON.
//! Mutations return `true`; queries return the entity or list.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;

pub use dispatch::{dispatch, Route};
pub use error::ResolverError;
pub use event::ResolverEvent;
