//! User lookup and provisioning.
//!
//! Users are created by the identity provider's post-confirmation
//! trigger, not by a GraphQL mutation. Provisioning merges on `sub_id`
//! so a re-delivered confirmation lands on the existing node; the
//! uniqueness constraint from `ensure_schema` backs this up at the
//! storage layer.

use neo4rs::query;
use uuid::Uuid;

use folio_core::{SubjectId, User};

use crate::client::{prop, GraphClient, GraphError};

impl GraphClient {
    /// Look up a User by subject id.
    pub async fn get_user(&self, sub_id: &SubjectId) -> Result<User, GraphError> {
        let q = query("MATCH (user:User {sub_id: $sub_id}) RETURN user")
            .param("sub_id", sub_id.to_string());

        match self.query_one(q).await? {
            Some(row) => user_from_row(&row),
            None => Err(GraphError::NotFound { label: "User" }),
        }
    }

    /// Create the User node for a confirmed identity. Idempotent.
    pub async fn provision_user(
        &self,
        sub_id: &SubjectId,
        email: &str,
    ) -> Result<User, GraphError> {
        let q = query(
            "MERGE (user:User {sub_id: $sub_id})
             ON CREATE SET user.email = $email
             RETURN user",
        )
        .param("sub_id", sub_id.to_string())
        .param("email", email.to_string());

        match self.query_one(q).await? {
            Some(row) => {
                let user = user_from_row(&row)?;
                tracing::info!(sub_id = %sub_id, user_id = user.id, "User provisioned");
                Ok(user)
            }
            None => Err(GraphError::NotFound { label: "User" }),
        }
    }
}

fn user_from_row(row: &neo4rs::Row) -> Result<User, GraphError> {
    let node: neo4rs::Node = row
        .get("user")
        .map_err(|e| GraphError::Serialization(format!("failed to read user node: {e}")))?;
    user_from_node(&node)
}

pub(crate) fn user_from_node(node: &neo4rs::Node) -> Result<User, GraphError> {
    let raw_sub: String = prop(node, "sub_id")?;
    let sub_id = Uuid::parse_str(&raw_sub)
        .map(SubjectId)
        .map_err(|e| GraphError::Serialization(format!("bad sub_id `{raw_sub}`: {e}")))?;

    Ok(User {
        id: node.id(),
        sub_id,
        email: prop(node, "email")?,
    })
}
