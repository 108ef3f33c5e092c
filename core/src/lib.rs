//! Async API client core for the taxonomy service.
//!
//! # Overview
//! Typed client for a hierarchical taxonomy REST API: layers contain
//! domains, domains contain terms, and terms are connected by
//! predicate-labeled relationships. Each resource gets CRUD operations, two
//! pagination modes (single page and transparent all-pages aggregation), and
//! semantic search where the server offers it.
//!
//! # Design
//! - HTTP I/O happens behind the [`HttpTransport`] trait; requests and
//!   responses are plain data, so tests script responses without a network.
//! - Non-2xx responses are classified into the [`ApiError`] taxonomy before
//!   any deserialization is attempted.
//! - Fetched data lives in an injected [`QueryCache`], keyed by
//!   (entity kind, scope). Every mutation invalidates the views it can
//!   affect: narrowly when the mutation result names them, broadly as a
//!   fallback when it does not.
//! - Reads retry with capped exponential backoff; mutations never retry.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pagination;
pub mod services;
pub mod types;

pub use cache::{CacheKey, EntityKind, QueryCache, Scope};
pub use client::TaxonomyClient;
pub use config::{ClientConfig, RetryPolicy};
pub use error::{ApiError, BulkError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use pagination::{ListParams, ListResponse, Page};
pub use types::{
    CreateDomain, CreateLayer, CreateRelationship, CreateTerm, Domain, FindRequest, FindResult,
    Layer, Term, TermRef, TermRelationship, UpdateDomain, UpdateLayer, UpdateRelationship,
    UpdateTerm,
};
