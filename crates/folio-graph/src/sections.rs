//! Section operations.
//!
//! Sections are soft-deleted: reads exclude nodes carrying `deleted_at`,
//! and deletion is refused while any live Publication head is attached.

use chrono::Utc;
use neo4rs::query;

use folio_core::{Publication, Section, SubjectId, User};

use crate::client::{opt_timestamp, prop, timestamp, GraphClient, GraphError};
use crate::publications::publication_from_node;
use crate::users::user_from_node;

impl GraphClient {
    /// Ownership-scoped single lookup by synthetic id.
    pub async fn get_section(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
    ) -> Result<Section, GraphError> {
        let q = query(
            "MATCH (user:User {sub_id: $sub_id})-[:OWNS]->(section:Section)
             WHERE id(section) = $section_id AND section.deleted_at IS NULL
             RETURN section",
        )
        .param("sub_id", sub_id.to_string())
        .param("section_id", section_id);

        match self.query_one(q).await? {
            Some(row) => section_from_row(&row),
            None => Err(GraphError::NotFound { label: "Section" }),
        }
    }

    /// All live Sections owned by the caller, newest first.
    pub async fn list_sections(&self, sub_id: &SubjectId) -> Result<Vec<Section>, GraphError> {
        let q = query(
            "MATCH (user:User {sub_id: $sub_id})-[:OWNS]->(section:Section)
             WHERE section.deleted_at IS NULL
             RETURN section
             ORDER BY section.created_at DESC",
        )
        .param("sub_id", sub_id.to_string());

        let rows = self.query_rows(q).await?;
        rows.iter().map(section_from_row).collect()
    }

    /// Attach a new Section under the caller's User node.
    pub async fn create_section(
        &self,
        sub_id: &SubjectId,
        name: &str,
    ) -> Result<Section, GraphError> {
        let now = Utc::now().to_rfc3339();
        let q = query(
            "MATCH (user:User {sub_id: $sub_id})
             CREATE (user)-[:OWNS]->(section:Section {
               name: $name, created_at: $now, updated_at: $now
             })
             RETURN section",
        )
        .param("sub_id", sub_id.to_string())
        .param("name", name.to_string())
        .param("now", now);

        match self.query_one(q).await? {
            Some(row) => section_from_row(&row),
            None => Err(GraphError::NotFound { label: "User" }),
        }
    }

    /// Rename a Section. Scope check and mutation are one statement.
    pub async fn update_section(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
        name: &str,
    ) -> Result<Section, GraphError> {
        let q = query(
            "MATCH (user:User {sub_id: $sub_id})-[:OWNS]->(section:Section)
             WHERE id(section) = $section_id AND section.deleted_at IS NULL
             SET section.name = $name, section.updated_at = $now
             RETURN section",
        )
        .param("sub_id", sub_id.to_string())
        .param("section_id", section_id)
        .param("name", name.to_string())
        .param("now", Utc::now().to_rfc3339());

        match self.query_one(q).await? {
            Some(row) => section_from_row(&row),
            None => Err(GraphError::NotFound { label: "Section" }),
        }
    }

    /// Soft-delete a Section.
    ///
    /// The referential guard and the mutation are a single statement:
    /// the deletion timestamp is only written when no live Publication
    /// head is attached, so a concurrent `create_publication` cannot
    /// slip between check and delete.
    pub async fn delete_section(
        &self,
        sub_id: &SubjectId,
        section_id: i64,
    ) -> Result<(), GraphError> {
        let q = query(
            "MATCH (user:User {sub_id: $sub_id})-[:OWNS]->(section:Section)
             WHERE id(section) = $section_id AND section.deleted_at IS NULL
             OPTIONAL MATCH (section)-[:CREATES_PUBLICATION]->(publication:Publication)
             WHERE publication.deleted_at IS NULL
             WITH section, count(publication) AS live_publications
             SET section.deleted_at = CASE
               WHEN live_publications = 0 THEN $now ELSE section.deleted_at
             END
             RETURN live_publications",
        )
        .param("sub_id", sub_id.to_string())
        .param("section_id", section_id)
        .param("now", Utc::now().to_rfc3339());

        match self.query_one(q).await? {
            Some(row) => {
                let live: i64 = row.get("live_publications").map_err(|e| {
                    GraphError::Serialization(format!("failed to read guard count: {e}"))
                })?;
                if live > 0 {
                    return Err(GraphError::Constraint(
                        "Your section has publications.".to_string(),
                    ));
                }
                Ok(())
            }
            None => Err(GraphError::NotFound { label: "Section" }),
        }
    }

    /// Resolve the owning User of an already-authorized Section.
    ///
    /// No independent sub_id check: the Section id can only have come
    /// from an upstream fetch that already walked the ownership chain.
    pub async fn section_owner(&self, section_id: i64) -> Result<User, GraphError> {
        let q = query(
            "MATCH (user:User)-[:OWNS]->(section:Section)
             WHERE id(section) = $section_id
             RETURN user",
        )
        .param("section_id", section_id);

        match self.query_one(q).await? {
            Some(row) => {
                let node: neo4rs::Node = row.get("user").map_err(|e| {
                    GraphError::Serialization(format!("failed to read user node: {e}"))
                })?;
                user_from_node(&node)
            }
            None => Err(GraphError::NotFound { label: "User" }),
        }
    }

    /// Live Publication heads of an already-authorized Section, newest
    /// first.
    pub async fn section_publications(
        &self,
        section_id: i64,
    ) -> Result<Vec<Publication>, GraphError> {
        let q = query(
            "MATCH (section:Section)-[:CREATES_PUBLICATION]->(publication:Publication)
             WHERE id(section) = $section_id AND publication.deleted_at IS NULL
             RETURN publication
             ORDER BY publication.created_at DESC",
        )
        .param("section_id", section_id);

        let rows = self.query_rows(q).await?;
        rows.iter()
            .map(|row| {
                let node: neo4rs::Node = row.get("publication").map_err(|e| {
                    GraphError::Serialization(format!("failed to read publication node: {e}"))
                })?;
                publication_from_node(&node)
            })
            .collect()
    }
}

fn section_from_row(row: &neo4rs::Row) -> Result<Section, GraphError> {
    let node: neo4rs::Node = row
        .get("section")
        .map_err(|e| GraphError::Serialization(format!("failed to read section node: {e}")))?;
    section_from_node(&node)
}

pub(crate) fn section_from_node(node: &neo4rs::Node) -> Result<Section, GraphError> {
    Ok(Section {
        id: node.id(),
        name: prop(node, "name")?,
        created_at: timestamp(node, "created_at")?,
        updated_at: timestamp(node, "updated_at")?,
        deleted_at: opt_timestamp(node, "deleted_at")?,
    })
}
