//! Layer operations.

use uuid::Uuid;

use crate::cache::{CacheKey, EntityKind, QueryCache};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::pagination::{ListParams, Page};
use crate::types::{CreateLayer, FindRequest, FindResult, Layer, UpdateLayer};

/// Handle for the `/api/layers/` resource.
pub struct Layers<'a> {
    pub(crate) api: &'a ApiClient,
    pub(crate) cache: &'a QueryCache,
}

impl Layers<'_> {
    const PATH: &'static str = "layers/";

    /// List layers. Without an explicit `limit` this aggregates every page;
    /// the result is cached under the query's canonical parameter token.
    pub async fn list(&self, params: ListParams) -> Result<Vec<Layer>, ApiError> {
        let key = CacheKey::list(EntityKind::Layer, params.cache_token());
        if let Some(hit) = self.cache.get::<Vec<Layer>>(&key) {
            return Ok(hit);
        }
        let layers = self.api.list_aggregate(Self::PATH, &params).await?;
        self.cache.set(key, &layers);
        Ok(layers)
    }

    /// One page, items only. Uncached.
    pub async fn list_page(&self, params: ListParams) -> Result<Vec<Layer>, ApiError> {
        self.api.list_page(Self::PATH, &params).await
    }

    /// One page with the full envelope, for page-count and next/prev UI.
    pub async fn list_page_with_meta(&self, params: ListParams) -> Result<Page<Layer>, ApiError> {
        self.api.list_page_with_meta(Self::PATH, &params).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Layer, ApiError> {
        let key = CacheKey::detail(EntityKind::Layer, id);
        if let Some(hit) = self.cache.get::<Layer>(&key) {
            return Ok(hit);
        }
        let layer: Layer = self.api.get_json(&format!("layers/{id}"), Vec::new()).await?;
        self.cache.set(key, &layer);
        Ok(layer)
    }

    pub async fn create(&self, input: &CreateLayer) -> Result<Layer, ApiError> {
        let layer: Layer = self.api.post_json(Self::PATH, input).await?;
        self.cache
            .set(CacheKey::detail(EntityKind::Layer, layer.id), &layer);
        self.cache.invalidate_lists(EntityKind::Layer);
        Ok(layer)
    }

    pub async fn update(&self, id: Uuid, input: &UpdateLayer) -> Result<Layer, ApiError> {
        let layer: Layer = self.api.put_json(&format!("layers/{id}"), input).await?;
        self.cache
            .set(CacheKey::detail(EntityKind::Layer, layer.id), &layer);
        self.cache.invalidate_lists(EntityKind::Layer);
        Ok(layer)
    }

    /// Delete a layer. The server cascades to contained domains and terms,
    /// so their list views are swept along with the layer's.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.api.delete(&format!("layers/{id}")).await?;
        self.cache.remove(&CacheKey::detail(EntityKind::Layer, id));
        self.cache.invalidate_lists(EntityKind::Layer);
        self.cache.invalidate_lists(EntityKind::Domain);
        self.cache.invalidate_lists(EntityKind::Term);
        Ok(())
    }

    /// Semantic search over layers. Results are ranked server-side and are
    /// never cached.
    pub async fn find(&self, request: &FindRequest) -> Result<Vec<FindResult<Layer>>, ApiError> {
        self.api.post_json("layers/find", request).await
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

    fn layer_json(id: Uuid, title: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "definition": "d",
            "created_at": "2026-01-01T00:00:00+00:00",
            "version": 1
        })
    }

    fn client(transport: Arc<ScriptedTransport>) -> TaxonomyClient {
        TaxonomyClient::with_transport(ClientConfig::new("http://localhost:8000"), transport)
    }

    #[tokio::test]
    async fn get_is_served_from_cache_on_second_read() {
        let id = Uuid::from_u128(1);
        let transport =
            Arc::new(ScriptedTransport::new().respond_json(200, &layer_json(id, "Foundations")));
        let client = client(transport.clone());

        let first = client.layers().get(id).await.unwrap();
        let second = client.layers().get(id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn create_seeds_detail_and_sweeps_layer_lists() {
        let id = Uuid::from_u128(2);
        let transport = Arc::new(
            ScriptedTransport::new().respond_json(201, &layer_json(id, "New layer")),
        );
        let client = client(transport.clone());
        client.cache().set(CacheKey::list(EntityKind::Layer, ""), &Vec::<Layer>::new());
        client.cache().set(CacheKey::list(EntityKind::Term, ""), &Vec::<Layer>::new());

        let created = client
            .layers()
            .create(&CreateLayer {
                title: "New layer".to_string(),
                definition: None,
                primary_predicate: None,
            })
            .await
            .unwrap();

        assert!(!client.cache().contains(&CacheKey::list(EntityKind::Layer, "")));
        assert!(client.cache().contains(&CacheKey::list(EntityKind::Term, "")));
        // Detail was seeded: a follow-up get issues no request.
        let fetched = client.layers().get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn delete_sweeps_contained_kinds_lists() {
        let id = Uuid::from_u128(3);
        let transport = Arc::new(ScriptedTransport::new().respond(204, ""));
        let client = client(transport);
        let cache = client.cache();
        cache.set(CacheKey::detail(EntityKind::Layer, id), &1u32);
        cache.set(CacheKey::list(EntityKind::Layer, ""), &1u32);
        cache.set(CacheKey::list(EntityKind::Domain, ""), &1u32);
        cache.set(CacheKey::list(EntityKind::Term, ""), &1u32);
        cache.set(CacheKey::detail(EntityKind::Term, id), &1u32);

        client.layers().delete(id).await.unwrap();

        assert!(!cache.contains(&CacheKey::detail(EntityKind::Layer, id)));
        assert!(!cache.contains(&CacheKey::list(EntityKind::Layer, "")));
        assert!(!cache.contains(&CacheKey::list(EntityKind::Domain, "")));
        assert!(!cache.contains(&CacheKey::list(EntityKind::Term, "")));
        // Term details survive a layer delete; only list views are swept.
        assert!(cache.contains(&CacheKey::detail(EntityKind::Term, id)));
    }

    #[tokio::test]
    async fn list_caches_per_parameter_combination() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond_json(
                    200,
                    &json!({ "data": [layer_json(Uuid::from_u128(4), "A")], "total": 1, "skip": 0, "limit": 100 }),
                )
                .respond_json(
                    200,
                    &json!({ "data": [], "total": 0, "skip": 0, "limit": 100 }),
                ),
        );
        let client = client(transport.clone());

        let unsorted = client.layers().list(ListParams::new()).await.unwrap();
        let sorted = client
            .layers()
            .list(ListParams::new().sort("title"))
            .await
            .unwrap();
        assert_eq!(unsorted.len(), 1);
        assert_eq!(sorted.len(), 0);
        assert_eq!(transport.request_count(), 2);

        // Both tokens are now cached; repeats issue nothing.
        client.layers().list(ListParams::new()).await.unwrap();
        client
            .layers()
            .list(ListParams::new().sort("title"))
            .await
            .unwrap();
        assert_eq!(transport.request_count(), 2);
    }
}
