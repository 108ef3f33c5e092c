//! Domain operations.

use uuid::Uuid;

use crate::cache::{CacheKey, EntityKind, QueryCache};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::pagination::{ListParams, Page};
use crate::types::{CreateDomain, Domain, FindRequest, FindResult, UpdateDomain};

/// Handle for the `/api/domains/` resource.
pub struct Domains<'a> {
    pub(crate) api: &'a ApiClient,
    pub(crate) cache: &'a QueryCache,
}

impl Domains<'_> {
    const PATH: &'static str = "domains/";

    pub async fn list(&self, params: ListParams) -> Result<Vec<Domain>, ApiError> {
        let key = CacheKey::list(EntityKind::Domain, params.cache_token());
        if let Some(hit) = self.cache.get::<Vec<Domain>>(&key) {
            return Ok(hit);
        }
        let domains = self.api.list_aggregate(Self::PATH, &params).await?;
        self.cache.set(key, &domains);
        Ok(domains)
    }

    /// All domains of one layer.
    pub async fn list_by_layer(&self, layer_id: Uuid) -> Result<Vec<Domain>, ApiError> {
        self.list(ListParams::new().filter("layer_id", layer_id.to_string()))
            .await
    }

    pub async fn list_page(&self, params: ListParams) -> Result<Vec<Domain>, ApiError> {
        self.api.list_page(Self::PATH, &params).await
    }

    pub async fn list_page_with_meta(&self, params: ListParams) -> Result<Page<Domain>, ApiError> {
        self.api.list_page_with_meta(Self::PATH, &params).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Domain, ApiError> {
        let key = CacheKey::detail(EntityKind::Domain, id);
        if let Some(hit) = self.cache.get::<Domain>(&key) {
            return Ok(hit);
        }
        let domain: Domain = self.api.get_json(&format!("domains/{id}"), Vec::new()).await?;
        self.cache.set(key, &domain);
        Ok(domain)
    }

    pub async fn create(&self, input: &CreateDomain) -> Result<Domain, ApiError> {
        let domain: Domain = self.api.post_json(Self::PATH, input).await?;
        self.cache
            .set(CacheKey::detail(EntityKind::Domain, domain.id), &domain);
        self.cache.invalidate_lists(EntityKind::Domain);
        Ok(domain)
    }

    pub async fn update(&self, id: Uuid, input: &UpdateDomain) -> Result<Domain, ApiError> {
        let domain: Domain = self.api.put_json(&format!("domains/{id}"), input).await?;
        self.cache
            .set(CacheKey::detail(EntityKind::Domain, domain.id), &domain);
        self.cache.invalidate_lists(EntityKind::Domain);
        Ok(domain)
    }

    /// Delete a domain. Contained terms are cascaded server-side, so term
    /// list views are swept too.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.api.delete(&format!("domains/{id}")).await?;
        self.cache.remove(&CacheKey::detail(EntityKind::Domain, id));
        self.cache.invalidate_lists(EntityKind::Domain);
        self.cache.invalidate_lists(EntityKind::Term);
        Ok(())
    }

    pub async fn find(&self, request: &FindRequest) -> Result<Vec<FindResult<Domain>>, ApiError> {
        self.api.post_json("domains/find", request).await
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

    #[tokio::test]
    async fn list_by_layer_filters_and_caches_under_its_own_key() {
        let layer_id = Uuid::from_u128(9);
        let transport = Arc::new(ScriptedTransport::new().respond_json(
            200,
            &json!({ "data": [], "total": 0, "skip": 0, "limit": 100 }),
        ));
        let client =
            TaxonomyClient::with_transport(ClientConfig::new("http://localhost:8000"), transport.clone());

        client.domains().list_by_layer(layer_id).await.unwrap();

        let request = &transport.requests()[0];
        assert!(request
            .query
            .contains(&("layer_id".to_string(), layer_id.to_string())));
        let key = CacheKey::list(EntityKind::Domain, format!("layer_id={layer_id}"));
        assert!(client.cache().contains(&key));
    }

    #[tokio::test]
    async fn delete_sweeps_domain_and_term_lists_only() {
        let id = Uuid::from_u128(10);
        let transport = Arc::new(ScriptedTransport::new().respond(204, ""));
        let client =
            TaxonomyClient::with_transport(ClientConfig::new("http://localhost:8000"), transport);
        let cache = client.cache();
        cache.set(CacheKey::list(EntityKind::Domain, ""), &1u32);
        cache.set(CacheKey::list(EntityKind::Term, ""), &1u32);
        cache.set(CacheKey::list(EntityKind::Layer, ""), &1u32);

        client.domains().delete(id).await.unwrap();

        assert!(!cache.contains(&CacheKey::list(EntityKind::Domain, "")));
        assert!(!cache.contains(&CacheKey::list(EntityKind::Term, "")));
        assert!(cache.contains(&CacheKey::list(EntityKind::Layer, "")));
    }
}
