//! Inbound field-resolution request shape.
//!
//! Mirrors the AppSync resolver event: `info` names the field,
//! `identity.claims.sub` is the caller's stable subject id, and
//! `source` carries the already-fetched parent entity for nested
//! field resolvers.

use serde::Deserialize;
use serde_json::Value;

use folio_core::SubjectId;

#[derive(Debug, Clone, Deserialize)]
pub struct ResolverEvent {
    pub info: FieldInfo,
    #[serde(default)]
    pub arguments: Value,
    pub identity: Identity,
    #[serde(default)]
    pub source: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub parent_type_name: String,
    pub field_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub claims: Claims,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: SubjectId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_appsync_shaped_event() {
        let event: ResolverEvent = serde_json::from_str(
            r#"{
                "info": {"parentTypeName": "Query", "fieldName": "getSection"},
                "arguments": {"id": "42"},
                "identity": {"claims": {"sub": "5f0c7a3e-9f64-4d0b-8f59-2b9a61a7c111"}}
            }"#,
        )
        .unwrap();

        assert_eq!(event.info.parent_type_name, "Query");
        assert_eq!(event.info.field_name, "getSection");
        assert_eq!(event.arguments["id"], "42");
        assert!(event.source.is_none());
    }

    #[test]
    fn arguments_default_to_null_when_absent() {
        let event: ResolverEvent = serde_json::from_str(
            r#"{
                "info": {"parentTypeName": "Query", "fieldName": "listSections"},
                "identity": {"claims": {"sub": "5f0c7a3e-9f64-4d0b-8f59-2b9a61a7c111"}}
            }"#,
        )
        .unwrap();

        assert!(event.arguments.is_null());
    }

    #[test]
    fn nested_event_carries_source() {
        let event: ResolverEvent = serde_json::from_str(
            r#"{
                "info": {"parentTypeName": "Section", "fieldName": "publications"},
                "identity": {"claims": {"sub": "5f0c7a3e-9f64-4d0b-8f59-2b9a61a7c111"}},
                "source": {"id": 42, "name": "Blog"}
            }"#,
        )
        .unwrap();

        assert_eq!(event.source.unwrap()["id"], 42);
    }
}
