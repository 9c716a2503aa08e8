//! folio-core: Shared domain types for the Folio content graph.
//!
//! This crate defines the entities stored in the graph (User, Section,
//! Publication, Event), the typed inputs and patches accepted by the
//! mutation operations, and the subject-id newtype that anchors every
//! ownership chain.

pub mod types;

pub use types::{
    CreateEventInput, CreatePublicationInput, CreateSectionInput, DeleteEventInput,
    DeletePublicationInput, DeleteSectionInput, Event, EventPatch, Publication, PublicationPatch,
    Section, SubjectId, UpdateSectionInput, User,
};
