//! Publication operations and the version history chain.
//!
//! A Publication is never updated in place. `update_publication` builds
//! a new head node, retargets the Section's `CREATES_PUBLICATION` edge,
//! and links the new head to the retired node via `PREV_PUBLICATION`,
//! so the full edit history survives as a backward-linked chain.

use chrono::Utc;
use neo4rs::query;

use folio_core::{CreatePublicationInput, Publication, PublicationPatch, SubjectId};

use crate::client::{opt_timestamp, prop, timestamp, GraphClient, GraphError};

/// Name of the full-text index created by `ensure_schema`.
pub const SEARCH_INDEX: &str = "publication_search";

impl GraphClient {
    /// Ownership-scoped single lookup through User → Section → Publication.
    pub async fn get_publication(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
        publication_id: i64,
    ) -> Result<Publication, GraphError> {
        let q = query(
            "MATCH (user:User {sub_id: $sub_id})-[:OWNS]->(section:Section)
                   -[:CREATES_PUBLICATION]->(publication:Publication)
             WHERE id(section) = $section_id AND id(publication) = $publication_id
               AND publication.deleted_at IS NULL
             RETURN publication",
        )
        .param("sub_id", sub_id.to_string())
        .param("section_id", section_id)
        .param("publication_id", publication_id);

        match self.query_one(q).await? {
            Some(row) => publication_from_row(&row),
            None => Err(GraphError::NotFound {
                label: "Publication",
            }),
        }
    }

    /// Live Publication heads in a Section, newest first.
    pub async fn list_publications(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
    ) -> Result<Vec<Publication>, GraphError> {
        let q = query(
            "MATCH (user:User {sub_id: $sub_id})-[:OWNS]->(section:Section)
                   -[:CREATES_PUBLICATION]->(publication:Publication)
             WHERE id(section) = $section_id AND publication.deleted_at IS NULL
             RETURN publication
             ORDER BY publication.created_at DESC",
        )
        .param("sub_id", sub_id.to_string())
        .param("section_id", section_id);

        let rows = self.query_rows(q).await?;
        rows.iter().map(publication_from_row).collect()
    }

    /// Full-text search over title/subtitle/tags, constrained to the
    /// caller's Section. Index hits are re-matched through the ownership
    /// chain, so results outside the chain never surface.
    pub async fn search_publications(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
        term: &str,
    ) -> Result<Vec<Publication>, GraphError> {
        let q = query(
            "CALL db.index.fulltext.queryNodes($index, $term)
             YIELD node, score
             MATCH (user:User {sub_id: $sub_id})-[:OWNS]->(section:Section)
                   -[:CREATES_PUBLICATION]->(node)
             WHERE id(section) = $section_id AND node.deleted_at IS NULL
             RETURN node AS publication
             ORDER BY score DESC",
        )
        .param("index", SEARCH_INDEX.to_string())
        .param("term", term.to_string())
        .param("sub_id", sub_id.to_string())
        .param("section_id", section_id);

        let rows = self.query_rows(q).await?;
        rows.iter().map(publication_from_row).collect()
    }

    /// Create a Publication under a Section the caller owns. Scope check
    /// and creation are one statement: zero rows means the Section is
    /// absent, soft-deleted, or not the caller's.
    pub async fn create_publication(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
        input: &CreatePublicationInput,
    ) -> Result<Publication, GraphError> {
        let metadata = serde_json::to_string(&input.metadata)
            .map_err(|e| GraphError::Serialization(format!("bad metadata: {e}")))?;

        let mut props = vec![
            "title: $title",
            "description: $description",
            "image: $image",
            "metadata: $metadata",
            "is_completed: $is_completed",
            "created_at: $now",
            "updated_at: $now",
        ];
        if input.subtitle.is_some() {
            props.push("subtitle: $subtitle");
        }
        if input.tags.is_some() {
            props.push("tags: $tags");
        }

        let cypher = format!(
            "MATCH (user:User {{sub_id: $sub_id}})-[:OWNS]->(section:Section)
             WHERE id(section) = $section_id AND section.deleted_at IS NULL
             CREATE (section)-[:CREATES_PUBLICATION]->(publication:Publication {{
               {}
             }})
             RETURN publication",
            props.join(", ")
        );

        let mut q = query(&cypher)
            .param("sub_id", sub_id.to_string())
            .param("section_id", section_id)
            .param("title", input.title.clone())
            .param("description", input.description.clone())
            .param("image", input.image.clone())
            .param("metadata", metadata)
            .param("is_completed", input.is_completed.unwrap_or(false))
            .param("now", Utc::now().to_rfc3339());
        if let Some(subtitle) = &input.subtitle {
            q = q.param("subtitle", subtitle.clone());
        }
        if let Some(tags) = &input.tags {
            q = q.param("tags", tags.clone());
        }

        match self.query_one(q).await? {
            Some(row) => publication_from_row(&row),
            None => Err(GraphError::NotFound { label: "Section" }),
        }
    }

    /// Retire the current head and create a new one carrying forward
    /// every field the patch leaves unset.
    ///
    /// One conditional statement does all of it: match the ownership
    /// chain, drop the live edge, create the new head (unsupplied
    /// properties copied from the previous node inside the property
    /// map), retarget `CREATES_PUBLICATION`, and link `PREV_PUBLICATION`
    /// new → old. The retired node's `updated_at` becomes its retirement
    /// time.
    pub async fn update_publication(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
        publication_id: i64,
        patch: &PublicationPatch,
    ) -> Result<Publication, GraphError> {
        let props = [
            carried(patch.title.is_some(), "title"),
            carried(patch.subtitle.is_some(), "subtitle"),
            carried(patch.tags.is_some(), "tags"),
            carried(patch.description.is_some(), "description"),
            carried(patch.image.is_some(), "image"),
            carried(patch.metadata.is_some(), "metadata"),
            carried(patch.is_completed.is_some(), "is_completed"),
            "created_at: prev.created_at".to_string(),
            "updated_at: $now".to_string(),
        ];

        let cypher = format!(
            "MATCH (user:User {{sub_id: $sub_id}})-[:OWNS]->(section:Section)
                   -[live:CREATES_PUBLICATION]->(prev:Publication)
             WHERE id(section) = $section_id AND id(prev) = $publication_id
               AND prev.deleted_at IS NULL
             DELETE live
             CREATE (section)-[:CREATES_PUBLICATION]->(next:Publication {{
               {}
             }})
             CREATE (next)-[:PREV_PUBLICATION]->(prev)
             SET prev.updated_at = $now
             RETURN next AS publication",
            props.join(", ")
        );

        let mut q = query(&cypher)
            .param("sub_id", sub_id.to_string())
            .param("section_id", section_id)
            .param("publication_id", publication_id)
            .param("now", Utc::now().to_rfc3339());
        if let Some(title) = &patch.title {
            q = q.param("title", title.clone());
        }
        if let Some(subtitle) = &patch.subtitle {
            q = q.param("subtitle", subtitle.clone());
        }
        if let Some(tags) = &patch.tags {
            q = q.param("tags", tags.clone());
        }
        if let Some(description) = &patch.description {
            q = q.param("description", description.clone());
        }
        if let Some(image) = &patch.image {
            q = q.param("image", image.clone());
        }
        if let Some(metadata) = &patch.metadata {
            let encoded = serde_json::to_string(metadata)
                .map_err(|e| GraphError::Serialization(format!("bad metadata: {e}")))?;
            q = q.param("metadata", encoded);
        }
        if let Some(is_completed) = patch.is_completed {
            q = q.param("is_completed", is_completed);
        }

        match self.query_one(q).await? {
            Some(row) => publication_from_row(&row),
            None => Err(GraphError::NotFound {
                label: "Publication",
            }),
        }
    }

    /// Soft-delete the current head. The history chain is untouched.
    pub async fn delete_publication(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
        publication_id: i64,
    ) -> Result<(), GraphError> {
        let q = query(
            "MATCH (user:User {sub_id: $sub_id})-[:OWNS]->(section:Section)
                   -[:CREATES_PUBLICATION]->(publication:Publication)
             WHERE id(section) = $section_id AND id(publication) = $publication_id
               AND publication.deleted_at IS NULL
             SET publication.deleted_at = $now
             RETURN publication",
        )
        .param("sub_id", sub_id.to_string())
        .param("section_id", section_id)
        .param("publication_id", publication_id)
        .param("now", Utc::now().to_rfc3339());

        match self.query_one(q).await? {
            Some(_) => Ok(()),
            None => Err(GraphError::NotFound {
                label: "Publication",
            }),
        }
    }

    /// Walk the `PREV_PUBLICATION` chain from a head, most recently
    /// retired first. An empty list means the head has never been
    /// updated.
    pub async fn publication_history(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
        publication_id: i64,
    ) -> Result<Vec<Publication>, GraphError> {
        let q = query(
            "MATCH (user:User {sub_id: $sub_id})-[:OWNS]->(section:Section)
                   -[:CREATES_PUBLICATION]->(head:Publication)
             WHERE id(section) = $section_id AND id(head) = $publication_id
             OPTIONAL MATCH (head)-[:PREV_PUBLICATION*]->(prev:Publication)
             RETURN prev
             ORDER BY prev.updated_at DESC",
        )
        .param("sub_id", sub_id.to_string())
        .param("section_id", section_id)
        .param("publication_id", publication_id);

        let rows = self.query_rows(q).await?;
        if rows.is_empty() {
            return Err(GraphError::NotFound {
                label: "Publication",
            });
        }

        let mut history = Vec::with_capacity(rows.len());
        for row in &rows {
            let node: Option<neo4rs::Node> = row.get("prev").map_err(|e| {
                GraphError::Serialization(format!("failed to read history node: {e}"))
            })?;
            if let Some(node) = node {
                history.push(publication_from_node(&node)?);
            }
        }
        Ok(history)
    }
}

/// Property-map fragment for one patch field: take the parameter when
/// the patch supplies the field, otherwise copy from the previous node.
fn carried(present: bool, name: &str) -> String {
    if present {
        format!("{name}: ${name}")
    } else {
        format!("{name}: prev.{name}")
    }
}

fn publication_from_row(row: &neo4rs::Row) -> Result<Publication, GraphError> {
    let node: neo4rs::Node = row
        .get("publication")
        .map_err(|e| GraphError::Serialization(format!("failed to read publication node: {e}")))?;
    publication_from_node(&node)
}

pub(crate) fn publication_from_node(node: &neo4rs::Node) -> Result<Publication, GraphError> {
    let raw_metadata: String = prop(node, "metadata")?;
    let metadata = serde_json::from_str(&raw_metadata)
        .map_err(|e| GraphError::Serialization(format!("bad stored metadata: {e}")))?;

    Ok(Publication {
        id: node.id(),
        title: prop(node, "title")?,
        subtitle: node.get::<String>("subtitle").ok(),
        tags: node.get::<Vec<String>>("tags").ok(),
        description: prop(node, "description")?,
        image: prop(node, "image")?,
        metadata,
        is_completed: prop(node, "is_completed")?,
        created_at: timestamp(node, "created_at")?,
        updated_at: timestamp(node, "updated_at")?,
        deleted_at: opt_timestamp(node, "deleted_at")?,
    })
}
