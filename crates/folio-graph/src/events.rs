//! Event operations.
//!
//! Events carry no version chain: updates mutate the node in place and
//! deletion is a hard DETACH DELETE. Partial updates are presence-based,
//! so `ticketsAvailable: 0` is applied rather than dropped.

use chrono::Utc;
use neo4rs::query;

use folio_core::{CreateEventInput, Event, EventPatch, SubjectId};

use crate::client::{prop, timestamp, GraphClient, GraphError};

impl GraphClient {
    /// Ownership-scoped single lookup through User → Section → Event.
    pub async fn get_event(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
        event_id: i64,
    ) -> Result<Event, GraphError> {
        let q = query(
            "MATCH (user:User {sub_id: $sub_id})-[:OWNS]->(section:Section)
                   -[:CREATES_EVENT]->(event:Event)
             WHERE id(section) = $section_id AND id(event) = $event_id
             RETURN event",
        )
        .param("sub_id", sub_id.to_string())
        .param("section_id", section_id)
        .param("event_id", event_id);

        match self.query_one(q).await? {
            Some(row) => event_from_row(&row),
            None => Err(GraphError::NotFound { label: "Event" }),
        }
    }

    /// Events in a Section, newest first.
    pub async fn list_events(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
    ) -> Result<Vec<Event>, GraphError> {
        let q = query(
            "MATCH (user:User {sub_id: $sub_id})-[:OWNS]->(section:Section)
                   -[:CREATES_EVENT]->(event:Event)
             WHERE id(section) = $section_id
             RETURN event
             ORDER BY event.created_at DESC",
        )
        .param("sub_id", sub_id.to_string())
        .param("section_id", section_id);

        let rows = self.query_rows(q).await?;
        rows.iter().map(event_from_row).collect()
    }

    /// Create an Event under a Section the caller owns. Scope check and
    /// creation are one statement.
    pub async fn create_event(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
        input: &CreateEventInput,
    ) -> Result<Event, GraphError> {
        let q = query(
            "MATCH (user:User {sub_id: $sub_id})-[:OWNS]->(section:Section)
             WHERE id(section) = $section_id AND section.deleted_at IS NULL
             CREATE (section)-[:CREATES_EVENT]->(event:Event {
               date_start: $date_start,
               date_end: $date_end,
               name: $name,
               description: $description,
               image: $image,
               tickets_available: $tickets_available,
               location: $location,
               created_at: $now,
               updated_at: $now
             })
             RETURN event",
        )
        .param("sub_id", sub_id.to_string())
        .param("section_id", section_id)
        .param("date_start", input.date_start.clone())
        .param("date_end", input.date_end.clone())
        .param("name", input.name.clone())
        .param("description", input.description.clone())
        .param("image", input.image.clone())
        .param("tickets_available", input.tickets_available)
        .param("location", input.location.clone())
        .param("now", Utc::now().to_rfc3339());

        match self.query_one(q).await? {
            Some(row) => event_from_row(&row),
            None => Err(GraphError::NotFound { label: "Section" }),
        }
    }

    /// In-place partial update. Only fields the patch supplies are SET;
    /// the ownership chain is part of the same statement.
    pub async fn update_event(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
        event_id: i64,
        patch: &EventPatch,
    ) -> Result<Event, GraphError> {
        let sets = patch_set_clauses(patch);

        let cypher = format!(
            "MATCH (user:User {{sub_id: $sub_id}})-[:OWNS]->(section:Section)
                   -[:CREATES_EVENT]->(event:Event)
             WHERE id(section) = $section_id AND id(event) = $event_id
             SET {}
             RETURN event",
            sets.join(", ")
        );

        let mut q = query(&cypher)
            .param("sub_id", sub_id.to_string())
            .param("section_id", section_id)
            .param("event_id", event_id)
            .param("now", Utc::now().to_rfc3339());
        if let Some(date_start) = &patch.date_start {
            q = q.param("date_start", date_start.clone());
        }
        if let Some(date_end) = &patch.date_end {
            q = q.param("date_end", date_end.clone());
        }
        if let Some(name) = &patch.name {
            q = q.param("name", name.clone());
        }
        if let Some(description) = &patch.description {
            q = q.param("description", description.clone());
        }
        if let Some(image) = &patch.image {
            q = q.param("image", image.clone());
        }
        if let Some(tickets_available) = patch.tickets_available {
            q = q.param("tickets_available", tickets_available);
        }
        if let Some(location) = &patch.location {
            q = q.param("location", location.clone());
        }

        match self.query_one(q).await? {
            Some(row) => event_from_row(&row),
            None => Err(GraphError::NotFound { label: "Event" }),
        }
    }

    /// Hard-delete an Event, scoped through the ownership chain.
    pub async fn delete_event(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
        event_id: i64,
    ) -> Result<(), GraphError> {
        let q = query(
            "MATCH (user:User {sub_id: $sub_id})-[:OWNS]->(section:Section)
                   -[:CREATES_EVENT]->(event:Event)
             WHERE id(section) = $section_id AND id(event) = $event_id
             WITH event, id(event) AS deleted_id
             DETACH DELETE event
             RETURN deleted_id",
        )
        .param("sub_id", sub_id.to_string())
        .param("section_id", section_id)
        .param("event_id", event_id);

        match self.query_one(q).await? {
            Some(_) => Ok(()),
            None => Err(GraphError::NotFound { label: "Event" }),
        }
    }
}

/// SET clauses for the fields an EventPatch supplies. `updated_at` is
/// always refreshed, even for an empty patch.
fn patch_set_clauses(patch: &EventPatch) -> Vec<String> {
    let mut sets = vec!["event.updated_at = $now".to_string()];
    for (present, name) in [
        (patch.date_start.is_some(), "date_start"),
        (patch.date_end.is_some(), "date_end"),
        (patch.name.is_some(), "name"),
        (patch.description.is_some(), "description"),
        (patch.image.is_some(), "image"),
        (patch.tickets_available.is_some(), "tickets_available"),
        (patch.location.is_some(), "location"),
    ] {
        if present {
            sets.push(format!("event.{name} = ${name}"));
        }
    }
    sets
}

fn event_from_row(row: &neo4rs::Row) -> Result<Event, GraphError> {
    let node: neo4rs::Node = row
        .get("event")
        .map_err(|e| GraphError::Serialization(format!("failed to read event node: {e}")))?;
    event_from_node(&node)
}

fn event_from_node(node: &neo4rs::Node) -> Result<Event, GraphError> {
    Ok(Event {
        id: node.id(),
        name: prop(node, "name")?,
        description: prop(node, "description")?,
        image: prop(node, "image")?,
        date_start: prop(node, "date_start")?,
        date_end: prop(node, "date_end")?,
        tickets_available: prop(node, "tickets_available")?,
        location: prop(node, "location")?,
        created_at: timestamp(node, "created_at")?,
        updated_at: timestamp(node, "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::patch_set_clauses;
    use folio_core::EventPatch;

    fn patch(json: &str) -> EventPatch {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_patch_only_refreshes_updated_at() {
        let sets = patch_set_clauses(&patch(r#"{"id": "1", "sectionId": "2"}"#));
        assert_eq!(sets, vec!["event.updated_at = $now"]);
    }

    #[test]
    fn zero_tickets_is_a_real_update() {
        let sets = patch_set_clauses(&patch(
            r#"{"id": "1", "sectionId": "2", "ticketsAvailable": 0}"#,
        ));
        assert!(sets.contains(&"event.tickets_available = $tickets_available".to_string()));
    }

    #[test]
    fn only_supplied_fields_are_set() {
        let sets = patch_set_clauses(&patch(
            r#"{"id": "1", "sectionId": "2", "name": "Launch", "location": "Oslo"}"#,
        ));
        assert_eq!(sets.len(), 3);
        assert!(sets.contains(&"event.name = $name".to_string()));
        assert!(sets.contains(&"event.location = $location".to_string()));
        assert!(!sets.iter().any(|s| s.contains("date_start")));
    }
}
