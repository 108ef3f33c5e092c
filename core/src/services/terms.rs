//! Term operations.

use futures::future::join_all;
use uuid::Uuid;

use crate::cache::{CacheKey, EntityKind, QueryCache};
use crate::client::ApiClient;
use crate::error::{ApiError, BulkError};
use crate::pagination::{ListParams, Page};
use crate::types::{CreateTerm, FindRequest, FindResult, Term, UpdateTerm};

/// Handle for the `/api/terms/` resource.
pub struct Terms<'a> {
    pub(crate) api: &'a ApiClient,
    pub(crate) cache: &'a QueryCache,
}

impl Terms<'_> {
    const PATH: &'static str = "terms/";

    pub async fn list(&self, params: ListParams) -> Result<Vec<Term>, ApiError> {
        let key = CacheKey::list(EntityKind::Term, params.cache_token());
        if let Some(hit) = self.cache.get::<Vec<Term>>(&key) {
            return Ok(hit);
        }
        let terms = self.api.list_aggregate(Self::PATH, &params).await?;
        self.cache.set(key, &terms);
        Ok(terms)
    }

    /// All terms of one domain.
    pub async fn list_by_domain(&self, domain_id: Uuid) -> Result<Vec<Term>, ApiError> {
        self.list(ListParams::new().filter("domain_id", domain_id.to_string()))
            .await
    }

    /// All terms of one layer, across its domains.
    pub async fn list_by_layer(&self, layer_id: Uuid) -> Result<Vec<Term>, ApiError> {
        self.list(ListParams::new().filter("layer_id", layer_id.to_string()))
            .await
    }

    pub async fn list_page(&self, params: ListParams) -> Result<Vec<Term>, ApiError> {
        self.api.list_page(Self::PATH, &params).await
    }

    pub async fn list_page_with_meta(&self, params: ListParams) -> Result<Page<Term>, ApiError> {
        self.api.list_page_with_meta(Self::PATH, &params).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Term, ApiError> {
        let key = CacheKey::detail(EntityKind::Term, id);
        if let Some(hit) = self.cache.get::<Term>(&key) {
            return Ok(hit);
        }
        let term: Term = self.api.get_json(&format!("terms/{id}"), Vec::new()).await?;
        self.cache.set(key, &term);
        Ok(term)
    }

    pub async fn create(&self, input: &CreateTerm) -> Result<Term, ApiError> {
        let term: Term = self.api.post_json(Self::PATH, input).await?;
        self.cache
            .set(CacheKey::detail(EntityKind::Term, term.id), &term);
        self.cache.invalidate_lists(EntityKind::Term);
        Ok(term)
    }

    pub async fn update(&self, id: Uuid, input: &UpdateTerm) -> Result<Term, ApiError> {
        let term: Term = self.api.put_json(&format!("terms/{id}"), input).await?;
        self.cache
            .set(CacheKey::detail(EntityKind::Term, term.id), &term);
        self.cache.invalidate_lists(EntityKind::Term);
        Ok(term)
    }

    /// Delete a term. A deleted term may appear in views the delete response
    /// cannot name (by-domain lists, relationship endpoints), so the whole
    /// Term kind is swept rather than just its list scope.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.api.delete(&format!("terms/{id}")).await?;
        self.cache.invalidate_kind(EntityKind::Term);
        Ok(())
    }

    /// Delete many terms concurrently.
    ///
    /// All deletes are issued at once and the call resolves only after every
    /// one settles. On total success the deleted ids come back; if any delete
    /// fails the [`BulkError`] names both the failing subset and the ids that
    /// did complete. The Term kind is swept either way, since some deletes
    /// may have landed.
    pub async fn bulk_delete(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, BulkError> {
        let api = self.api;
        let outcomes = join_all(ids.iter().map(|id| async move {
            (*id, api.delete(&format!("terms/{id}")).await)
        }))
        .await;
        self.cache.invalidate_kind(EntityKind::Term);

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

    pub async fn find(&self, request: &FindRequest) -> Result<Vec<FindResult<Term>>, ApiError> {
        self.api.post_json("terms/find", request).await
    }
}
