//! Term relationship operations.
//!
//! Relationship mutations reach further than the other entities: a created
//! or updated relationship changes what its two endpoint terms look like, so
//! both term details and the derived by-term and by-predicate views are
//! invalidated alongside the relationship lists. Deletes can only do that
//! when the old value is still known: the cached detail is consulted, and a
//! cache miss falls back to sweeping both the Relationship and Term kinds.

use std::collections::HashSet;

use futures::future::join_all;
use uuid::Uuid;

use crate::cache::{CacheKey, EntityKind, QueryCache};
use crate::client::ApiClient;
use crate::error::{ApiError, BulkError};
use crate::pagination::{ListParams, Page};
use crate::types::{CreateRelationship, TermRelationship, UpdateRelationship};

/// Handle for the `/api/term-relationships/` resource.
pub struct Relationships<'a> {
    pub(crate) api: &'a ApiClient,
    pub(crate) cache: &'a QueryCache,
}

impl Relationships<'_> {
    const PATH: &'static str = "term-relationships/";

    /// List relationships. The endpoint predates the pagination envelope and
    /// returns a bare array, which the aggregator handles by paging until a
    /// short page.
    pub async fn list(&self, params: ListParams) -> Result<Vec<TermRelationship>, ApiError> {
        let key = CacheKey::list(EntityKind::Relationship, params.cache_token());
        if let Some(hit) = self.cache.get::<Vec<TermRelationship>>(&key) {
            return Ok(hit);
        }
        let relationships = self.api.list_aggregate(Self::PATH, &params).await?;
        self.cache.set(key, &relationships);
        Ok(relationships)
    }

    pub async fn list_page(&self, params: ListParams) -> Result<Vec<TermRelationship>, ApiError> {
        self.api.list_page(Self::PATH, &params).await
    }

    pub async fn list_page_with_meta(
        &self,
        params: ListParams,
    ) -> Result<Page<TermRelationship>, ApiError> {
        self.api.list_page_with_meta(Self::PATH, &params).await
    }

    /// Every relationship touching a term, as source or target.
    ///
    /// Issues one list filtered by `source_term_id` and one by
    /// `target_term_id`, then merges and deduplicates by relationship id. A
    /// relationship can only match both filters when source == target; the
    /// dedup guards that degenerate case regardless.
    pub async fn by_term(&self, term_id: Uuid) -> Result<Vec<TermRelationship>, ApiError> {
        let key = CacheKey::by_term(term_id);
        if let Some(hit) = self.cache.get::<Vec<TermRelationship>>(&key) {
            return Ok(hit);
        }

        let as_source = self
            .api
            .list_aggregate::<TermRelationship>(
                Self::PATH,
                &ListParams::new().filter("source_term_id", term_id.to_string()),
            )
            .await?;
        let as_target = self
            .api
            .list_aggregate::<TermRelationship>(
                Self::PATH,
                &ListParams::new().filter("target_term_id", term_id.to_string()),
            )
            .await?;

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for relationship in as_source.into_iter().chain(as_target) {
            if seen.insert(relationship.id) {
                merged.push(relationship);
            }
        }
        self.cache.set(key, &merged);
        Ok(merged)
    }

    /// Every relationship carrying a predicate.
    pub async fn by_predicate(&self, predicate: &str) -> Result<Vec<TermRelationship>, ApiError> {
        let key = CacheKey::by_predicate(predicate);
        if let Some(hit) = self.cache.get::<Vec<TermRelationship>>(&key) {
            return Ok(hit);
        }
        let relationships = self
            .api
            .list_aggregate(
                Self::PATH,
                &ListParams::new().filter("predicate", predicate.to_string()),
            )
            .await?;
        self.cache.set(key, &relationships);
        Ok(relationships)
    }

    pub async fn get(&self, id: Uuid) -> Result<TermRelationship, ApiError> {
        let key = CacheKey::detail(EntityKind::Relationship, id);
        if let Some(hit) = self.cache.get::<TermRelationship>(&key) {
            return Ok(hit);
        }
        let relationship: TermRelationship = self
            .api
            .get_json(&format!("term-relationships/{id}"), Vec::new())
            .await?;
        self.cache.set(key, &relationship);
        Ok(relationship)
    }

    pub async fn create(&self, input: &CreateRelationship) -> Result<TermRelationship, ApiError> {
        let relationship: TermRelationship = self.api.post_json(Self::PATH, input).await?;
        self.cache.set(
            CacheKey::detail(EntityKind::Relationship, relationship.id),
            &relationship,
        );
        self.invalidate_for(&relationship);
        Ok(relationship)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &UpdateRelationship,
    ) -> Result<TermRelationship, ApiError> {
        let relationship: TermRelationship = self
            .api
            .put_json(&format!("term-relationships/{id}"), input)
            .await?;
        self.cache.set(
            CacheKey::detail(EntityKind::Relationship, relationship.id),
            &relationship,
        );
        self.invalidate_for(&relationship);
        Ok(relationship)
    }

    /// Delete a relationship.
    ///
    /// When the detail is still cached its value names the affected views and
    /// invalidation stays targeted. Without it there is no way to know which
    /// terms or predicate were involved, so both the Relationship and Term
    /// kinds are swept, trading extra refetches for never serving a stale
    /// edge.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let detail_key = CacheKey::detail(EntityKind::Relationship, id);
        let cached: Option<TermRelationship> = self.cache.peek(&detail_key);

        self.api.delete(&format!("term-relationships/{id}")).await?;
        self.cache.remove(&detail_key);

        match cached {
            Some(relationship) => self.invalidate_for(&relationship),
            None => {
                self.cache.invalidate_kind(EntityKind::Relationship);
                self.cache.invalidate_kind(EntityKind::Term);
            }
        }
        Ok(())
    }

    /// Delete many relationships concurrently; same fan-out/fan-in contract
    /// as [`Terms::bulk_delete`](crate::services::Terms::bulk_delete). The
    /// Relationship kind is swept broadly rather than per item.
    pub async fn bulk_delete(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, BulkError> {
        let api = self.api;
        let outcomes = join_all(ids.iter().map(|id| async move {
            (*id, api.delete(&format!("term-relationships/{id}")).await)
        }))
        .await;
        self.cache.invalidate_kind(EntityKind::Relationship);

        let mut completed = Vec::new();
        let mut failed = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => completed.push(id),
                Err(err) => failed.push((id, err)),
            }
        }
        if failed.is_empty() {
            Ok(completed)
        } else {
            Err(BulkError { completed, failed })
        }
    }

    /// The targeted key set for a known relationship value: its lists, both
    /// derived views, and both endpoint term details.
    fn invalidate_for(&self, relationship: &TermRelationship) {
        self.cache.invalidate_lists(EntityKind::Relationship);
        self.cache.remove(&CacheKey::by_term(relationship.source_term_id));
        self.cache.remove(&CacheKey::by_term(relationship.target_term_id));
        self.cache
            .remove(&CacheKey::by_predicate(relationship.predicate.clone()));
        self.cache
            .remove(&CacheKey::detail(EntityKind::Term, relationship.source_term_id));
        self.cache
            .remove(&CacheKey::detail(EntityKind::Term, relationship.target_term_id));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::client::TaxonomyClient;
    use crate::config::ClientConfig;
    use crate::http::testing::ScriptedTransport;

    fn rel_json(id: Uuid, source: Uuid, target: Uuid, predicate: &str) -> serde_json::Value {
        json!({
            "id": id,
            "source_term_id": source,
            "target_term_id": target,
            "predicate": predicate,
            "created_at": "2026-02-01T00:00:00+00:00"
        })
    }

    fn client(transport: Arc<ScriptedTransport>) -> TaxonomyClient {
        TaxonomyClient::with_transport(ClientConfig::new("http://localhost:8000"), transport)
    }

    #[tokio::test]
    async fn by_term_merges_and_dedupes_self_referential_edge() {
        let term = Uuid::from_u128(20);
        let edge = rel_json(Uuid::from_u128(21), term, term, "related_to");
        // Same edge satisfies both filters; it must come back once.
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond_json(200, &json!([edge]))
                .respond_json(200, &json!([edge])),
        );
        let client = client(transport.clone());

        let merged = client.relationships().by_term(term).await.unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(transport.request_count(), 2);

        let filters: Vec<Vec<(String, String)>> =
            transport.requests().iter().map(|r| r.query.clone()).collect();
        assert!(filters[0].contains(&("source_term_id".to_string(), term.to_string())));
        assert!(filters[1].contains(&("target_term_id".to_string(), term.to_string())));

        // Cached: a repeat issues nothing.
        client.relationships().by_term(term).await.unwrap();
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn create_invalidates_narrow_key_set_and_spares_the_rest() {
        let source = Uuid::from_u128(22);
        let target = Uuid::from_u128(23);
        let rel_id = Uuid::from_u128(24);
        let transport = Arc::new(ScriptedTransport::new().respond_json(
            201,
            &rel_json(rel_id, source, target, "broader_than"),
        ));
        let client = client(transport);
        let cache = client.cache();
        cache.set(CacheKey::detail(EntityKind::Term, source), &1u32);
        cache.set(CacheKey::detail(EntityKind::Term, target), &1u32);
        cache.set(CacheKey::list(EntityKind::Relationship, ""), &1u32);
        cache.set(CacheKey::by_term(source), &1u32);
        cache.set(CacheKey::by_term(target), &1u32);
        cache.set(CacheKey::by_predicate("broader_than"), &1u32);
        // Unrelated entries that must survive.
        cache.set(CacheKey::list(EntityKind::Layer, ""), &1u32);
        cache.set(CacheKey::by_predicate("narrower_than"), &1u32);
        cache.set(CacheKey::detail(EntityKind::Term, Uuid::from_u128(99)), &1u32);

        client
            .relationships()
            .create(&CreateRelationship {
                source_term_id: source,
                target_term_id: target,
                predicate: "broader_than".to_string(),
            })
            .await
            .unwrap();

        assert!(!cache.contains(&CacheKey::detail(EntityKind::Term, source)));
        assert!(!cache.contains(&CacheKey::detail(EntityKind::Term, target)));
        assert!(!cache.contains(&CacheKey::list(EntityKind::Relationship, "")));
        assert!(!cache.contains(&CacheKey::by_term(source)));
        assert!(!cache.contains(&CacheKey::by_term(target)));
        assert!(!cache.contains(&CacheKey::by_predicate("broader_than")));

        assert!(cache.contains(&CacheKey::list(EntityKind::Layer, "")));
        assert!(cache.contains(&CacheKey::by_predicate("narrower_than")));
        assert!(cache.contains(&CacheKey::detail(EntityKind::Term, Uuid::from_u128(99))));
        // The created relationship's own detail was seeded.
        assert!(cache.contains(&CacheKey::detail(EntityKind::Relationship, rel_id)));
    }

    #[tokio::test]
    async fn delete_with_cached_detail_stays_targeted() {
        let source = Uuid::from_u128(25);
        let target = Uuid::from_u128(26);
        let rel_id = Uuid::from_u128(27);
        let relationship: TermRelationship =
            serde_json::from_value(rel_json(rel_id, source, target, "is_a")).unwrap();
        let transport = Arc::new(ScriptedTransport::new().respond(200, ""));
        let client = client(transport);
        let cache = client.cache();
        cache.set(CacheKey::detail(EntityKind::Relationship, rel_id), &relationship);
        cache.set(CacheKey::detail(EntityKind::Term, source), &1u32);
        cache.set(CacheKey::detail(EntityKind::Term, Uuid::from_u128(99)), &1u32);
        cache.set(CacheKey::by_predicate("other"), &1u32);

        client.relationships().delete(rel_id).await.unwrap();

        assert!(!cache.contains(&CacheKey::detail(EntityKind::Relationship, rel_id)));
        assert!(!cache.contains(&CacheKey::detail(EntityKind::Term, source)));
        // Unrelated term detail and predicate view survive the narrow path.
        assert!(cache.contains(&CacheKey::detail(EntityKind::Term, Uuid::from_u128(99))));
        assert!(cache.contains(&CacheKey::by_predicate("other")));
    }

    #[tokio::test]
    async fn delete_without_cached_detail_falls_back_to_broad_sweep() {
        let rel_id = Uuid::from_u128(28);
        let transport = Arc::new(ScriptedTransport::new().respond(200, ""));
        let client = client(transport);
        let cache = client.cache();
        cache.set(CacheKey::detail(EntityKind::Term, Uuid::from_u128(99)), &1u32);
        cache.set(CacheKey::by_predicate("other"), &1u32);
        cache.set(CacheKey::list(EntityKind::Layer, ""), &1u32);

        client.relationships().delete(rel_id).await.unwrap();

        // Broad fallback: every Term and Relationship entry goes.
        assert!(!cache.contains(&CacheKey::detail(EntityKind::Term, Uuid::from_u128(99))));
        assert!(!cache.contains(&CacheKey::by_predicate("other")));
        assert!(cache.contains(&CacheKey::list(EntityKind::Layer, "")));
    }

    #[tokio::test]
    async fn bulk_delete_sweeps_relationship_kind() {
        let ids = [Uuid::from_u128(30), Uuid::from_u128(31)];
        let transport = Arc::new(ScriptedTransport::new().respond(200, "").respond(200, ""));
        let client = client(transport);
        let cache = client.cache();
        cache.set(CacheKey::by_term(Uuid::from_u128(40)), &1u32);
        cache.set(CacheKey::detail(EntityKind::Term, Uuid::from_u128(41)), &1u32);

        let deleted = client.relationships().bulk_delete(&ids).await.unwrap();
        assert_eq!(deleted, ids);
        assert!(!cache.contains(&CacheKey::by_term(Uuid::from_u128(40))));
        // Bulk relationship delete sweeps its own kind only.
        assert!(cache.contains(&CacheKey::detail(EntityKind::Term, Uuid::from_u128(41))));
    }
}
