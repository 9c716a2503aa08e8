//! Domain types for the Folio content graph.
//!
//! Entities carry the synthetic numeric id assigned by the graph engine;
//! callers pass it back as a decimal string for targeted lookups. All
//! JSON field names are camelCase to match the GraphQL schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Identity ──────────────────────────────────────────────────────

/// The stable subject id from the caller's identity token (`sub` claim).
/// Every ownership chain in the graph is rooted at the User node
/// carrying this id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SubjectId(pub Uuid);

impl SubjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ── Entities ──────────────────────────────────────────────────────

/// A registered account, provisioned on identity confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub sub_id: SubjectId,
    pub email: String,
}

/// A named container owned by exactly one User via an `OWNS` edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Versioned editorial content attached to a Section.
///
/// The Section's `CREATES_PUBLICATION` edge always points at the current
/// head; retired versions hang off the head via `PREV_PUBLICATION`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub description: String,
    pub image: String,
    /// Free-form client blob, stored JSON-encoded in the graph.
    pub metadata: serde_json::Value,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A scheduled event attached to a Section. Updated in place; no
/// version chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image: String,
    /// Client-supplied date strings, stored opaquely.
    pub date_start: String,
    pub date_end: String,
    pub tickets_available: i64,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Mutation inputs ───────────────────────────────────────────────
//
// Ids arrive as decimal strings (GraphQL ID scalars); the resolver
// parses them before the repository sees them.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectionInput {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSectionInput {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSectionInput {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePublicationInput {
    pub section_id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub description: String,
    pub image: String,
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

/// Partial update for a Publication. `None` means "carry forward the
/// current value"; `Some` applies even when the value is falsy
/// (`false`, `""`, `[]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationPatch {
    pub id: String,
    pub section_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePublicationInput {
    pub id: String,
    pub section_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    pub section_id: String,
    pub date_start: String,
    pub date_end: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub tickets_available: i64,
    pub location: String,
}

/// Partial in-place update for an Event. Presence-based: supplying
/// `ticketsAvailable: 0` sets it to zero rather than being dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub id: String,
    pub section_id: String,
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_end: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tickets_available: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventInput {
    pub id: String,
    pub section_id: String,
}
