//! Pagination envelope, list parameters, and page arithmetic.
//!
//! # Design
//! List endpoints come in two shapes: the paginated
//! `{ data, total, skip, limit }` envelope (layers, domains, terms) and a
//! legacy bare array (term relationships). [`ListResponse`] absorbs both.
//! [`ListParams`] serializes into query pairs in one canonical order so the
//! same logical query always produces the same cache key, independent of the
//! order filters were added in.

use serde::{Deserialize, Serialize};

/// One page of a paginated list response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    /// 1-based page number of this page.
    pub fn current_page(&self) -> u64 {
        if self.limit == 0 {
            1
        } else {
            self.skip / self.limit + 1
        }
    }

    /// Total number of pages at this page's limit.
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            self.total.div_ceil(self.limit)
        }
    }

    /// Whether a further page exists beyond this one.
    pub fn has_next_page(&self) -> bool {
        self.skip + self.limit < self.total
    }
}

/// A list response in either the paginated envelope or the legacy bare-array
/// shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paged(Page<T>),
    Bare(Vec<T>),
}

impl<T> ListResponse<T> {
    /// The items, discarding any envelope.
    pub fn into_data(self) -> Vec<T> {
        match self {
            ListResponse::Paged(page) => page.data,
            ListResponse::Bare(data) => data,
        }
    }

    /// Items plus the server-reported total, if the endpoint reported one.
    pub fn into_parts(self) -> (Vec<T>, Option<u64>) {
        match self {
            ListResponse::Paged(page) => {
                let total = page.total;
                (page.data, Some(total))
            }
            ListResponse::Bare(data) => (data, None),
        }
    }

    /// Normalize to a [`Page`]. Legacy bare arrays synthesize the envelope
    /// from the requested window; their `total` only reflects what was
    /// actually returned, so page math on them is a lower bound.
    pub fn into_page(self, skip: u64, limit: u64) -> Page<T> {
        match self {
            ListResponse::Paged(page) => page,
            ListResponse::Bare(data) => {
                let total = skip + data.len() as u64;
                Page {
                    data,
                    total,
                    skip,
                    limit,
                }
            }
        }
    }
}

/// Parameters for list operations.
///
/// `limit` doubles as the paging-mode switch: when set, `list` issues exactly
/// one request with the caller's window; when unset, `list` aggregates every
/// page (see [`crate::client`]).
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<String>,
    pub filters: Vec<(String, String)>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sort key; the server accepts `title` and `created_at`.
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    /// Query pairs in canonical order: skip, limit, sort, then filters
    /// sorted by key.
    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(skip) = self.skip {
            query.push(("skip".to_string(), skip.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(sort) = &self.sort {
            query.push(("sort".to_string(), sort.clone()));
        }
        let mut filters = self.filters.clone();
        filters.sort();
        query.extend(filters);
        query
    }

    /// Canonical `k=v&k=v` token used in list cache keys.
    pub(crate) fn cache_token(&self) -> String {
        self.to_query()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: u64, skip: u64, limit: u64) -> Page<u32> {
        Page {
            data: Vec::new(),
            total,
            skip,
            limit,
        }
    }

    #[test]
    fn page_math() {
        let p = page(95, 0, 10);
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.total_pages(), 10);
        assert!(p.has_next_page());

        let p = page(95, 90, 10);
        assert_eq!(p.current_page(), 10);
        assert!(!p.has_next_page());

        let p = page(100, 50, 25);
        assert_eq!(p.current_page(), 3);
        assert_eq!(p.total_pages(), 4);
        assert!(p.has_next_page());
    }

    #[test]
    fn page_math_zero_limit_does_not_divide() {
        let p = page(10, 0, 0);
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.total_pages(), 0);
        assert!(p.has_next_page());
    }

    #[test]
    fn envelope_parses_as_paged() {
        let json = r#"{"data": [1, 2, 3], "total": 7, "skip": 0, "limit": 3}"#;
        let response: ListResponse<u32> = serde_json::from_str(json).unwrap();
        let (data, total) = response.into_parts();
        assert_eq!(data, vec![1, 2, 3]);
        assert_eq!(total, Some(7));
    }

    #[test]
    fn bare_array_parses_as_legacy() {
        let json = r#"[4, 5]"#;
        let response: ListResponse<u32> = serde_json::from_str(json).unwrap();
        let (data, total) = response.into_parts();
        assert_eq!(data, vec![4, 5]);
        assert_eq!(total, None);
    }

    #[test]
    fn bare_array_synthesizes_envelope() {
        let response: ListResponse<u32> = ListResponse::Bare(vec![4, 5]);
        let page = response.into_page(10, 50);
        assert_eq!(page.total, 12);
        assert_eq!(page.skip, 10);
        assert_eq!(page.limit, 50);
    }

    #[test]
    fn query_order_is_canonical() {
        let params = ListParams::new()
            .filter("source_term_id", "b")
            .filter("predicate", "a")
            .limit(10)
            .skip(20)
            .sort("title");
        let query = params.to_query();
        let keys: Vec<&str> = query.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["skip", "limit", "sort", "predicate", "source_term_id"]);
    }

    #[test]
    fn cache_token_is_insertion_order_independent() {
        let a = ListParams::new().filter("layer_id", "x").filter("domain_id", "y");
        let b = ListParams::new().filter("domain_id", "y").filter("layer_id", "x");
        assert_eq!(a.cache_token(), b.cache_token());
        assert_eq!(a.cache_token(), "domain_id=y&layer_id=x");
    }
}
