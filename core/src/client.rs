//! The taxonomy API client: request plumbing, page aggregation, and the
//! public entry point.
//!
//! # Design
//! [`ApiClient`] owns the transport and config and implements the shared
//! request/decode path every service goes through: reads are executed through
//! the retry policy, mutations exactly once, and non-2xx responses are
//! classified into the error taxonomy before deserialization is attempted.
//! [`TaxonomyClient`] wires an `ApiClient` to an injected [`QueryCache`] and
//! hands out per-entity service handles.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::error::{classify_response, ApiError};
use crate::http::{
    execute_with_retry, HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
};
use crate::pagination::{ListParams, ListResponse, Page};
use crate::services::{Domains, Layers, Relationships, Terms};

pub(crate) struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    pub(crate) config: ClientConfig,
}

impl ApiClient {
    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.config.base_url, path)
    }

    fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
        if !response.is_success() {
            return Err(classify_response(response.status, &response.body));
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    fn encode<B: Serialize>(body: &B) -> Result<String, ApiError> {
        serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
    }

    /// GET with retries.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let request = HttpRequest::new(HttpMethod::Get, self.url(path)).with_query(query);
        let response = execute_with_retry(self.transport.as_ref(), &request, &self.config.retry).await?;
        Self::decode(response)
    }

    /// POST, executed exactly once.
    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request =
            HttpRequest::new(HttpMethod::Post, self.url(path)).with_json_body(Self::encode(body)?);
        let response = self.transport.execute(&request).await?;
        Self::decode(response)
    }

    /// PUT, executed exactly once.
    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request =
            HttpRequest::new(HttpMethod::Put, self.url(path)).with_json_body(Self::encode(body)?);
        let response = self.transport.execute(&request).await?;
        Self::decode(response)
    }

    /// DELETE, executed exactly once. Any 2xx counts as success; the server
    /// answers 204 for entities and 200 with an empty body for relationships.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = HttpRequest::new(HttpMethod::Delete, self.url(path));
        let response = self.transport.execute(&request).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(classify_response(response.status, &response.body))
        }
    }

    /// One list request, returning items only.
    pub(crate) async fn list_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ListParams,
    ) -> Result<Vec<T>, ApiError> {
        let response: ListResponse<T> = self.get_json(path, params.to_query()).await?;
        Ok(response.into_data())
    }

    /// One list request, returning the full envelope (synthesized for legacy
    /// bare-array endpoints).
    pub(crate) async fn list_page_with_meta<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ListParams,
    ) -> Result<Page<T>, ApiError> {
        let skip = params.skip.unwrap_or(0);
        let limit = params.limit.unwrap_or(self.config.max_page_size);
        let response: ListResponse<T> = self.get_json(path, params.to_query()).await?;
        Ok(response.into_page(skip, limit))
    }

    /// The uniform list operation.
    ///
    /// An explicit `limit` opts into manual paging: one request, items only.
    /// Otherwise every page is fetched sequentially at `max_page_size`,
    /// starting from `skip = 0`, and concatenated in server order. After each
    /// page the loop stops on the first of: an empty page, a short page, or
    /// having collected at least the server-reported total. Any page failure
    /// fails the whole aggregation; there is no partial result.
    pub(crate) async fn list_aggregate<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ListParams,
    ) -> Result<Vec<T>, ApiError> {
        if params.limit.is_some() {
            return self.list_page(path, params).await;
        }

        let page_size = self.config.max_page_size;
        let mut collected: Vec<T> = Vec::new();
        let mut skip = 0u64;
        loop {
            let page_params = params.clone().skip(skip).limit(page_size);
            let response: ListResponse<T> = self.get_json(path, page_params.to_query()).await?;
            let (data, total) = response.into_parts();
            let count = data.len() as u64;
            collected.extend(data);
            debug!(path, skip, count, total, "aggregated page");

            if count == 0 || count < page_size {
                break;
            }
            if let Some(total) = total {
                if collected.len() as u64 >= total {
                    break;
                }
            }
            skip += page_size;
        }
        Ok(collected)
    }
}

/// Client for the taxonomy API.
///
/// Holds the transport, the configuration, and the injected query cache.
/// Operations live on the per-entity handles returned by [`layers`],
/// [`domains`], [`terms`], and [`relationships`].
///
/// [`layers`]: TaxonomyClient::layers
/// [`domains`]: TaxonomyClient::domains
/// [`terms`]: TaxonomyClient::terms
/// [`relationships`]: TaxonomyClient::relationships
pub struct TaxonomyClient {
    api: ApiClient,
    cache: QueryCache,
}

impl TaxonomyClient {
    /// Client with the default reqwest transport and a fresh cache sized by
    /// the config's staleness windows.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = Arc::new(ReqwestTransport::new(config.timeout)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Client over a custom transport (tests script responses through this).
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let cache = QueryCache::new(config.stale_time, config.cache_time);
        Self::with_cache(config, transport, cache)
    }

    /// Client sharing an externally owned cache.
    pub fn with_cache(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        cache: QueryCache,
    ) -> Self {
        Self {
            api: ApiClient { transport, config },
            cache,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn layers(&self) -> Layers<'_> {
        Layers {
            api: &self.api,
            cache: &self.cache,
        }
    }

    pub fn domains(&self) -> Domains<'_> {
        Domains {
            api: &self.api,
            cache: &self.cache,
        }
    }

    pub fn terms(&self) -> Terms<'_> {
        Terms {
            api: &self.api,
            cache: &self.cache,
        }
    }

    pub fn relationships(&self) -> Relationships<'_> {
        Relationships {
            api: &self.api,
            cache: &self.cache,
        }
    }
}
