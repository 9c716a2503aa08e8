//! Routing from (parentTypeName, fieldName) to repository operations.
//!
//! The table is fixed: the GraphQL schema is resolved elsewhere and only
//! the pairs listed here reach the graph. Id arguments arrive as decimal
//! strings and are parsed before the repository sees them.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use folio_core::{
    CreateEventInput, CreatePublicationInput, CreateSectionInput, DeleteEventInput,
    DeletePublicationInput, DeleteSectionInput, EventPatch, PublicationPatch, SubjectId,
    UpdateSectionInput,
};
use folio_graph::GraphClient;

use crate::error::{ResolverError, Result};
use crate::event::ResolverEvent;

/// A resolvable field. One variant per (parent type, field) pair the
/// backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    GetUser,
    GetSection,
    ListSections,
    GetPublication,
    ListPublications,
    SearchPublications,
    ListPublicationHistory,
    GetEvent,
    ListEvents,
    CreateSection,
    UpdateSection,
    DeleteSection,
    CreatePublication,
    UpdatePublication,
    DeletePublication,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    SectionUser,
    SectionPublications,
}

impl Route {
    /// Look up the operation for a field. `None` means no resolver.
    pub fn resolve(parent_type: &str, field: &str) -> Option<Self> {
        match (parent_type, field) {
            ("Query", "getUser") => Some(Self::GetUser),
            ("Query", "getSection") => Some(Self::GetSection),
            ("Query", "listSections") => Some(Self::ListSections),
            ("Query", "getPublication") => Some(Self::GetPublication),
            ("Query", "listPublications") => Some(Self::ListPublications),
            ("Query", "searchPublications") => Some(Self::SearchPublications),
            ("Query", "listPublicationHistory") => Some(Self::ListPublicationHistory),
            ("Query", "getEvent") => Some(Self::GetEvent),
            ("Query", "listEvents") => Some(Self::ListEvents),
            ("Mutation", "createSection") => Some(Self::CreateSection),
            ("Mutation", "updateSection") => Some(Self::UpdateSection),
            ("Mutation", "deleteSection") => Some(Self::DeleteSection),
            ("Mutation", "createPublication") => Some(Self::CreatePublication),
            ("Mutation", "updatePublication") => Some(Self::UpdatePublication),
            ("Mutation", "deletePublication") => Some(Self::DeletePublication),
            ("Mutation", "createEvent") => Some(Self::CreateEvent),
            ("Mutation", "updateEvent") => Some(Self::UpdateEvent),
            ("Mutation", "deleteEvent") => Some(Self::DeleteEvent),
            ("Section", "user") => Some(Self::SectionUser),
            ("Section", "publications") => Some(Self::SectionPublications),
            _ => None,
        }
    }
}

// ── Argument shapes ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetUserArgs {
    /// Subject id to look up; defaults to the caller's own claim.
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdArg {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionIdArg {
    section_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityArgs {
    id: String,
    section_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    section_id: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct InputArg<T> {
    input: T,
}

// ── Dispatch ─────────────────────────────────────────────────────

/// Resolve one field request against the graph.
pub async fn dispatch(event: &ResolverEvent, graph: &GraphClient) -> Result<Value> {
    let parent = event.info.parent_type_name.as_str();
    let field = event.info.field_name.as_str();
    let route = Route::resolve(parent, field).ok_or_else(|| ResolverError::RoutingFailure {
        parent_type: parent.to_string(),
        field: field.to_string(),
    })?;
    let sub = &event.identity.claims.sub;

    tracing::debug!(parent, field, sub_id = %sub, "Dispatching resolver");

    match route {
        Route::GetUser => {
            let a: GetUserArgs = args(event)?;
            let target = match a.id.as_deref() {
                Some(raw) => SubjectId(Uuid::parse_str(raw).map_err(|_| {
                    ResolverError::InvalidId {
                        field: field.to_string(),
                        value: raw.to_string(),
                    }
                })?),
                None => sub.clone(),
            };
            shape(&graph.get_user(&target).await?)
        }
        Route::GetSection => {
            let a: IdArg = args(event)?;
            shape(&graph.get_section(sub, parse_id(field, &a.id)?).await?)
        }
        Route::ListSections => shape(&graph.list_sections(sub).await?),
        Route::GetPublication => {
            let a: EntityArgs = args(event)?;
            let section_id = parse_id(field, &a.section_id)?;
            let id = parse_id(field, &a.id)?;
            shape(&graph.get_publication(sub, section_id, id).await?)
        }
        Route::ListPublications => {
            let a: SectionIdArg = args(event)?;
            shape(&graph.list_publications(sub, parse_id(field, &a.section_id)?).await?)
        }
        Route::SearchPublications => {
            let a: SearchArgs = args(event)?;
            let section_id = parse_id(field, &a.section_id)?;
            shape(&graph.search_publications(sub, section_id, &a.value).await?)
        }
        Route::ListPublicationHistory => {
            let a: EntityArgs = args(event)?;
            let section_id = parse_id(field, &a.section_id)?;
            let id = parse_id(field, &a.id)?;
            shape(&graph.publication_history(sub, section_id, id).await?)
        }
        Route::GetEvent => {
            let a: EntityArgs = args(event)?;
            let section_id = parse_id(field, &a.section_id)?;
            let id = parse_id(field, &a.id)?;
            shape(&graph.get_event(sub, section_id, id).await?)
        }
        Route::ListEvents => {
            let a: SectionIdArg = args(event)?;
            shape(&graph.list_events(sub, parse_id(field, &a.section_id)?).await?)
        }
        Route::CreateSection => {
            let a: InputArg<CreateSectionInput> = args(event)?;
            graph.create_section(sub, &a.input.name).await?;
            Ok(Value::Bool(true))
        }
        Route::UpdateSection => {
            let a: InputArg<UpdateSectionInput> = args(event)?;
            let id = parse_id(field, &a.input.id)?;
            graph.update_section(sub, id, &a.input.name).await?;
            Ok(Value::Bool(true))
        }
        Route::DeleteSection => {
            let a: InputArg<DeleteSectionInput> = args(event)?;
            graph.delete_section(sub, parse_id(field, &a.input.id)?).await?;
            Ok(Value::Bool(true))
        }
        Route::CreatePublication => {
            let a: InputArg<CreatePublicationInput> = args(event)?;
            let section_id = parse_id(field, &a.input.section_id)?;
            graph.create_publication(sub, section_id, &a.input).await?;
            Ok(Value::Bool(true))
        }
        Route::UpdatePublication => {
            let a: InputArg<PublicationPatch> = args(event)?;
            let section_id = parse_id(field, &a.input.section_id)?;
            let id = parse_id(field, &a.input.id)?;
            graph.update_publication(sub, section_id, id, &a.input).await?;
            Ok(Value::Bool(true))
        }
        Route::DeletePublication => {
            let a: InputArg<DeletePublicationInput> = args(event)?;
            let section_id = parse_id(field, &a.input.section_id)?;
            let id = parse_id(field, &a.input.id)?;
            graph.delete_publication(sub, section_id, id).await?;
            Ok(Value::Bool(true))
        }
        Route::CreateEvent => {
            let a: InputArg<CreateEventInput> = args(event)?;
            let section_id = parse_id(field, &a.input.section_id)?;
            graph.create_event(sub, section_id, &a.input).await?;
            Ok(Value::Bool(true))
        }
        Route::UpdateEvent => {
            let a: InputArg<EventPatch> = args(event)?;
            let section_id = parse_id(field, &a.input.section_id)?;
            let id = parse_id(field, &a.input.id)?;
            graph.update_event(sub, section_id, id, &a.input).await?;
            Ok(Value::Bool(true))
        }
        Route::DeleteEvent => {
            let a: InputArg<DeleteEventInput> = args(event)?;
            let section_id = parse_id(field, &a.input.section_id)?;
            let id = parse_id(field, &a.input.id)?;
            graph.delete_event(sub, section_id, id).await?;
            Ok(Value::Bool(true))
        }
        // Nested fields anchor at the parent's id: the parent was itself
        // fetched through an authorized path upstream.
        Route::SectionUser => {
            let section_id = source_id(event)?;
            shape(&graph.section_owner(section_id).await?)
        }
        Route::SectionPublications => {
            let section_id = source_id(event)?;
            shape(&graph.section_publications(section_id).await?)
        }
    }
}

/// Decode the event's arguments into a typed shape. Absent arguments
/// decode as an empty object.
fn args<T: DeserializeOwned>(event: &ResolverEvent) -> Result<T> {
    let value = if event.arguments.is_null() {
        Value::Object(Default::default())
    } else {
        event.arguments.clone()
    };
    serde_json::from_value(value).map_err(|e| ResolverError::Arguments {
        field: event.info.field_name.clone(),
        source: e,
    })
}

fn shape<T: serde::Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Parse a decimal-string synthetic id.
fn parse_id(field: &str, value: &str) -> Result<i64> {
    value.parse::<i64>().map_err(|_| ResolverError::InvalidId {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Synthetic id of the parent entity for a nested field resolver.
/// Accepts both the numeric shape this crate emits and the string shape
/// clients may echo back.
fn source_id(event: &ResolverEvent) -> Result<i64> {
    let field = &event.info.field_name;
    let source = event
        .source
        .as_ref()
        .ok_or_else(|| ResolverError::MissingSource {
            field: field.clone(),
        })?;

    match &source["id"] {
        Value::Number(n) => n.as_i64().ok_or_else(|| ResolverError::InvalidId {
            field: field.clone(),
            value: n.to_string(),
        }),
        Value::String(s) => parse_id(field, s),
        other => Err(ResolverError::InvalidId {
            field: field.clone(),
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ResolverEvent;

    fn event(parent: &str, field: &str, arguments: Value, source: Option<Value>) -> ResolverEvent {
        serde_json::from_value(serde_json::json!({
            "info": {"parentTypeName": parent, "fieldName": field},
            "arguments": arguments,
            "identity": {"claims": {"sub": "5f0c7a3e-9f64-4d0b-8f59-2b9a61a7c111"}},
            "source": source
        }))
        .unwrap()
    }

    #[test]
    fn routing_table_covers_all_served_fields() {
        let served = [
            ("Query", "getUser"),
            ("Query", "getSection"),
            ("Query", "listSections"),
            ("Query", "getPublication"),
            ("Query", "listPublications"),
            ("Query", "searchPublications"),
            ("Query", "listPublicationHistory"),
            ("Query", "getEvent"),
            ("Query", "listEvents"),
            ("Mutation", "createSection"),
            ("Mutation", "updateSection"),
            ("Mutation", "deleteSection"),
            ("Mutation", "createPublication"),
            ("Mutation", "updatePublication"),
            ("Mutation", "deletePublication"),
            ("Mutation", "createEvent"),
            ("Mutation", "updateEvent"),
            ("Mutation", "deleteEvent"),
            ("Section", "user"),
            ("Section", "publications"),
        ];
        for (parent, field) in served {
            assert!(
                Route::resolve(parent, field).is_some(),
                "no route for {parent}.{field}"
            );
        }
    }

    #[test]
    fn unknown_field_has_no_route() {
        assert!(Route::resolve("Query", "getSections").is_none());
        assert!(Route::resolve("Mutation", "getSection").is_none());
        assert!(Route::resolve("Event", "section").is_none());
    }

    #[test]
    fn parse_id_rejects_non_decimal() {
        assert!(parse_id("getSection", "42").is_ok());
        let err = parse_id("getSection", "forty-two").unwrap_err();
        assert!(matches!(err, ResolverError::InvalidId { .. }));
    }

    #[test]
    fn source_id_accepts_number_and_string() {
        let numeric = event(
            "Section",
            "publications",
            Value::Null,
            Some(serde_json::json!({"id": 42})),
        );
        assert_eq!(source_id(&numeric).unwrap(), 42);

        let stringy = event(
            "Section",
            "user",
            Value::Null,
            Some(serde_json::json!({"id": "42"})),
        );
        assert_eq!(source_id(&stringy).unwrap(), 42);
    }

    #[test]
    fn source_id_requires_a_source() {
        let bare = event("Section", "publications", Value::Null, None);
        let err = source_id(&bare).unwrap_err();
        assert!(matches!(err, ResolverError::MissingSource { .. }));
    }

    #[test]
    fn args_decode_wrapped_input() {
        let e = event(
            "Mutation",
            "createSection",
            serde_json::json!({"input": {"name": "Blog"}}),
            None,
        );
        let a: InputArg<folio_core::CreateSectionInput> = args(&e).unwrap();
        assert_eq!(a.input.name, "Blog");
    }

    #[test]
    fn args_tolerate_absent_arguments() {
        let e = event("Query", "getUser", Value::Null, None);
        let a: GetUserArgs = args(&e).unwrap();
        assert!(a.id.is_none());
    }

    #[test]
    fn bad_input_reports_the_field() {
        let e = event(
            "Mutation",
            "createSection",
            serde_json::json!({"input": {"title": "wrong key"}}),
            None,
        );
        let err = args::<InputArg<folio_core::CreateSectionInput>>(&e).unwrap_err();
        match err {
            ResolverError::Arguments { field, .. } => assert_eq!(field, "createSection"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
