//! DTOs for the taxonomy API.
//!
//! # Design
//! These types mirror the server's schema but are defined independently of
//! the mock-server crate; integration tests catch schema drift. The server
//! also returns embedding vectors on some entities; those fields are simply
//! ignored on deserialization, the client has no use for them. `Update*`
//! payloads serialize only the fields that are present, so a partial update
//! never clobbers omitted fields on the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level grouping entity of the taxonomy hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Layer {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub primary_predicate: Option<String>,
    #[serde(default)]
    pub version: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Mid-level entity scoped to exactly one layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Domain {
    pub id: Uuid,
    pub layer_id: Uuid,
    pub title: String,
    pub definition: String,
    #[serde(default)]
    pub version: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Leaf concept entity scoped to one domain (and transitively one layer),
/// optionally parented to another term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Term {
    pub id: Uuid,
    pub domain_id: Uuid,
    pub layer_id: Uuid,
    pub title: String,
    pub definition: String,
    #[serde(default)]
    pub parent_term_id: Option<Uuid>,
    #[serde(default)]
    pub version: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Endpoint summary embedded in relationship responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TermRef {
    pub id: Uuid,
    pub title: String,
}

/// Directed, predicate-labeled edge between two terms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TermRelationship {
    pub id: Uuid,
    pub source_term_id: Uuid,
    pub target_term_id: Uuid,
    pub predicate: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub source_term: Option<TermRef>,
    #[serde(default)]
    pub target_term: Option<TermRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLayer {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_predicate: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_predicate: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDomain {
    pub layer_id: Uuid,
    pub title: String,
    pub definition: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDomain {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTerm {
    pub domain_id: Uuid,
    pub layer_id: Uuid,
    pub title: String,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_term_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTerm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_term_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRelationship {
    pub source_term_id: Uuid,
    pub target_term_id: Uuid,
    pub predicate: String,
}

/// Only the predicate of a relationship is mutable; endpoints are fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRelationship {
    pub predicate: String,
}

/// Body of the `POST .../find` semantic-search endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
}

/// A ranked search hit. Scoring is entirely server-side; the client treats
/// `score` and `distance` as opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindResult<T> {
    #[serde(flatten)]
    pub entity: T,
    pub score: f32,
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_deserializes_and_ignores_embeddings() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "title": "Foundations",
            "definition": "Base layer",
            "primary_predicate": "is_a",
            "title_embedding": [0.1, 0.2],
            "created_at": "2026-01-05T10:00:00+00:00",
            "version": 3,
            "last_modified": "2026-01-06T11:30:00+00:00"
        }"#;
        let layer: Layer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.title, "Foundations");
        assert_eq!(layer.version, Some(3));
        assert!(layer.last_modified.is_some());
    }

    #[test]
    fn update_layer_serializes_only_present_fields() {
        let update = UpdateLayer {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["title"], "Renamed");
        assert!(json.get("definition").is_none());
        assert!(json.get("primary_predicate").is_none());
    }

    #[test]
    fn relationship_endpoint_summaries_are_optional() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000009",
            "source_term_id": "00000000-0000-0000-0000-000000000002",
            "target_term_id": "00000000-0000-0000-0000-000000000003",
            "predicate": "broader_than",
            "created_at": "2026-02-01T00:00:00+00:00"
        }"#;
        let rel: TermRelationship = serde_json::from_str(json).unwrap();
        assert!(rel.source_term.is_none());
        assert_eq!(rel.predicate, "broader_than");
    }

    #[test]
    fn find_result_flattens_entity_fields() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "title": "Foundations",
            "created_at": "2026-01-05T10:00:00+00:00",
            "score": 0.92,
            "distance": 0.08
        }"#;
        let result: FindResult<Layer> = serde_json::from_str(json).unwrap();
        assert_eq!(result.entity.title, "Foundations");
        assert!(result.score > 0.9);
    }

    #[test]
    fn find_request_omits_unset_options() {
        let request = FindRequest {
            query: "network".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["query"], "network");
        assert!(json.get("limit").is_none());
        assert!(json.get("threshold").is_none());
    }
}
