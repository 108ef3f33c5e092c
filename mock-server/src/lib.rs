//! In-memory taxonomy API server for integration tests.
//!
//! # Design
//! Implements the upstream REST contract the client is written against:
//! layers, domains, and terms answer list requests with the
//! `{ data, total, skip, limit }` envelope, while term relationships keep the
//! legacy bare-array shape. Error bodies follow the FastAPI format the real
//! server emits: `{"detail": "..."}` for plain messages and
//! `{"detail": [{"loc", "msg", "type"}]}` for validation failures. State is
//! a shared in-memory store; nothing persists across restarts.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use uuid::Uuid;

const MAX_PAGE_SIZE: u64 = 100;
const DEFAULT_PAGE_SIZE: u64 = 50;

#[derive(Clone, Debug, Serialize)]
pub struct Layer {
    pub id: Uuid,
    pub title: String,
    pub definition: Option<String>,
    pub primary_predicate: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Domain {
    pub id: Uuid,
    pub layer_id: Uuid,
    pub title: String,
    pub definition: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Term {
    pub id: Uuid,
    pub domain_id: Uuid,
    pub layer_id: Uuid,
    pub title: String,
    pub definition: String,
    pub parent_term_id: Option<Uuid>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TermRelationship {
    pub id: Uuid,
    pub source_term_id: Uuid,
    pub target_term_id: Uuid,
    pub predicate: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct Store {
    pub layers: HashMap<Uuid, Layer>,
    pub domains: HashMap<Uuid, Domain>,
    pub terms: HashMap<Uuid, Term>,
    pub relationships: HashMap<Uuid, TermRelationship>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Deserialize)]
pub struct CreateLayer {
    pub title: String,
    pub definition: Option<String>,
    pub primary_predicate: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateLayer {
    pub title: Option<String>,
    pub definition: Option<String>,
    pub primary_predicate: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateDomain {
    pub layer_id: Uuid,
    pub title: String,
    pub definition: String,
}

#[derive(Deserialize)]
pub struct UpdateDomain {
    pub title: Option<String>,
    pub definition: Option<String>,
    pub layer_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateTerm {
    pub domain_id: Uuid,
    pub layer_id: Uuid,
    pub title: String,
    pub definition: String,
    pub parent_term_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateTerm {
    pub title: Option<String>,
    pub definition: Option<String>,
    pub parent_term_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateRelationship {
    pub source_term_id: Uuid,
    pub target_term_id: Uuid,
    pub predicate: String,
}

#[derive(Deserialize)]
pub struct UpdateRelationship {
    pub predicate: String,
}

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<String>,
    pub layer_id: Option<Uuid>,
    pub domain_id: Option<Uuid>,
    pub source_term_id: Option<Uuid>,
    pub target_term_id: Option<Uuid>,
    pub predicate: Option<String>,
}

#[derive(Deserialize)]
pub struct FindBody {
    pub query: String,
    pub limit: Option<usize>,
    pub threshold: Option<f32>,
}

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    router(db)
}

pub fn router(db: Db) -> Router {
    Router::new()
        .route("/api/layers/", get(list_layers).post(create_layer))
        .route("/api/layers/find", post(find_layers))
        .route(
            "/api/layers/{id}",
            get(get_layer).put(update_layer).delete(delete_layer),
        )
        .route("/api/domains/", get(list_domains).post(create_domain))
        .route("/api/domains/find", post(find_domains))
        .route(
            "/api/domains/{id}",
            get(get_domain).put(update_domain).delete(delete_domain),
        )
        .route("/api/terms/", get(list_terms).post(create_term))
        .route("/api/terms/find", post(find_terms))
        .route(
            "/api/terms/{id}",
            get(get_term).put(update_term).delete(delete_term),
        )
        .route(
            "/api/term-relationships/",
            get(list_relationships).post(create_relationship),
        )
        .route(
            "/api/term-relationships/{id}",
            get(get_relationship)
                .put(update_relationship)
                .delete(delete_relationship),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn validation_error(loc: &[&str], msg: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "detail": [{ "loc": loc, "msg": msg, "type": "value_error" }]
        })),
    )
}

fn conflict_error(msg: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::CONFLICT, Json(json!({ "detail": msg })))
}

fn bad_request(msg: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": msg })))
}

fn not_found(msg: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": msg })))
}

fn check_title(title: &str) -> ApiResult<()> {
    if title.chars().count() < 2 {
        return Err(validation_error(
            &["body", "title"],
            "String should have at least 2 characters",
        ));
    }
    Ok(())
}

/// Apply skip/limit and wrap in the pagination envelope. `limit` is capped
/// at 100, mirroring the real server's `Query(50, le=100)` bound.
fn paginate<T: Serialize>(items: Vec<T>, query: &ListQuery) -> Value {
    let total = items.len() as u64;
    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let data: Vec<&T> = items
        .iter()
        .skip(skip as usize)
        .take(limit as usize)
        .collect();
    json!({ "data": data, "total": total, "skip": skip, "limit": limit })
}

/// Deterministic stand-in for the real server's embedding search.
fn find_score(title: &str, query: &str) -> f32 {
    let title = title.to_lowercase();
    let query = query.to_lowercase();
    if title == query {
        1.0
    } else if title.contains(&query) || query.contains(&title) {
        0.7
    } else {
        0.0
    }
}

fn ranked_results<T: Serialize>(
    entities: Vec<(f32, T)>,
    body: &FindBody,
) -> Json<Vec<Value>> {
    let threshold = body.threshold.unwrap_or(0.1);
    let limit = body.limit.unwrap_or(10);
    let mut scored: Vec<(f32, T)> = entities
        .into_iter()
        .filter(|(score, _)| *score >= threshold)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    let results = scored
        .into_iter()
        .take(limit)
        .map(|(score, entity)| {
            let mut value = serde_json::to_value(entity).unwrap_or_else(|_| json!({}));
            value["score"] = json!(score);
            value["distance"] = json!(1.0 - score);
            value
        })
        .collect();
    Json(results)
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

async fn list_layers(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Value> {
    let store = db.read().await;
    let mut layers: Vec<Layer> = store.layers.values().cloned().collect();
    // Id tie-break keeps paging windows stable when timestamps collide.
    match query.sort.as_deref() {
        Some("title") => layers.sort_by(|a, b| (&a.title, a.id).cmp(&(&b.title, b.id))),
        _ => layers.sort_by_key(|l| (l.created_at, l.id)),
    }
    Json(paginate(layers, &query))
}

async fn create_layer(
    State(db): State<Db>,
    Json(input): Json<CreateLayer>,
) -> ApiResult<(StatusCode, Json<Layer>)> {
    check_title(&input.title)?;
    let mut store = db.write().await;
    if store.layers.values().any(|l| l.title == input.title) {
        return Err(conflict_error("Layer title already exists."));
    }
    let layer = Layer {
        id: Uuid::new_v4(),
        title: input.title,
        definition: input.definition,
        primary_predicate: input.primary_predicate,
        version: 1,
        created_at: Utc::now(),
        last_modified: Some(Utc::now()),
    };
    store.layers.insert(layer.id, layer.clone());
    Ok((StatusCode::CREATED, Json(layer)))
}

async fn get_layer(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<Layer>> {
    let store = db.read().await;
    store
        .layers
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Layer not found."))
}

async fn update_layer(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateLayer>,
) -> ApiResult<Json<Layer>> {
    if let Some(title) = &input.title {
        check_title(title)?;
    }
    let mut store = db.write().await;
    if let Some(title) = &input.title {
        if store.layers.values().any(|l| l.id != id && &l.title == title) {
            return Err(conflict_error("Layer title already exists."));
        }
    }
    let layer = store
        .layers
        .get_mut(&id)
        .ok_or_else(|| not_found("Layer not found."))?;
    if let Some(title) = input.title {
        layer.title = title;
    }
    if let Some(definition) = input.definition {
        layer.definition = Some(definition);
    }
    if let Some(predicate) = input.primary_predicate {
        layer.primary_predicate = Some(predicate);
    }
    layer.version += 1;
    layer.last_modified = Some(Utc::now());
    Ok(Json(layer.clone()))
}

async fn delete_layer(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store
        .layers
        .remove(&id)
        .ok_or_else(|| not_found("Layer not found."))?;
    // Cascade: contained domains and terms, and edges touching those terms.
    store.domains.retain(|_, d| d.layer_id != id);
    let removed_terms: Vec<Uuid> = store
        .terms
        .values()
        .filter(|t| t.layer_id == id)
        .map(|t| t.id)
        .collect();
    store.terms.retain(|_, t| t.layer_id != id);
    store.relationships.retain(|_, r| {
        !removed_terms.contains(&r.source_term_id) && !removed_terms.contains(&r.target_term_id)
    });
    Ok(StatusCode::NO_CONTENT)
}

async fn find_layers(
    State(db): State<Db>,
    Json(body): Json<FindBody>,
) -> Json<Vec<Value>> {
    let store = db.read().await;
    let scored = store
        .layers
        .values()
        .map(|l| (find_score(&l.title, &body.query), l.clone()))
        .collect();
    ranked_results(scored, &body)
}

// ---------------------------------------------------------------------------
// Domains
// ---------------------------------------------------------------------------

async fn list_domains(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Value> {
    let store = db.read().await;
    let mut domains: Vec<Domain> = store
        .domains
        .values()
        .filter(|d| query.layer_id.is_none_or(|layer_id| d.layer_id == layer_id))
        .cloned()
        .collect();
    match query.sort.as_deref() {
        Some("title") => domains.sort_by(|a, b| (&a.title, a.id).cmp(&(&b.title, b.id))),
        _ => domains.sort_by_key(|d| (d.created_at, d.id)),
    }
    Json(paginate(domains, &query))
}

async fn create_domain(
    State(db): State<Db>,
    Json(input): Json<CreateDomain>,
) -> ApiResult<(StatusCode, Json<Domain>)> {
    check_title(&input.title)?;
    if input.definition.is_empty() {
        return Err(validation_error(
            &["body", "definition"],
            "String should have at least 1 character",
        ));
    }
    let mut store = db.write().await;
    if !store.layers.contains_key(&input.layer_id) {
        return Err(bad_request("Layer does not exist."));
    }
    let domain = Domain {
        id: Uuid::new_v4(),
        layer_id: input.layer_id,
        title: input.title,
        definition: input.definition,
        version: 1,
        created_at: Utc::now(),
        last_modified: Some(Utc::now()),
    };
    store.domains.insert(domain.id, domain.clone());
    Ok((StatusCode::CREATED, Json(domain)))
}

async fn get_domain(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<Domain>> {
    let store = db.read().await;
    store
        .domains
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Domain not found."))
}

async fn update_domain(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateDomain>,
) -> ApiResult<Json<Domain>> {
    if let Some(title) = &input.title {
        check_title(title)?;
    }
    let mut store = db.write().await;
    if let Some(layer_id) = input.layer_id {
        if !store.layers.contains_key(&layer_id) {
            return Err(bad_request("Layer does not exist."));
        }
    }
    let domain = store
        .domains
        .get_mut(&id)
        .ok_or_else(|| not_found("Domain not found."))?;
    if let Some(title) = input.title {
        domain.title = title;
    }
    if let Some(definition) = input.definition {
        domain.definition = definition;
    }
    if let Some(layer_id) = input.layer_id {
        domain.layer_id = layer_id;
    }
    domain.version += 1;
    domain.last_modified = Some(Utc::now());
    Ok(Json(domain.clone()))
}

async fn delete_domain(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store
        .domains
        .remove(&id)
        .ok_or_else(|| not_found("Domain not found."))?;
    let removed_terms: Vec<Uuid> = store
        .terms
        .values()
        .filter(|t| t.domain_id == id)
        .map(|t| t.id)
        .collect();
    store.terms.retain(|_, t| t.domain_id != id);
    store.relationships.retain(|_, r| {
        !removed_terms.contains(&r.source_term_id) && !removed_terms.contains(&r.target_term_id)
    });
    Ok(StatusCode::NO_CONTENT)
}

async fn find_domains(
    State(db): State<Db>,
    Json(body): Json<FindBody>,
) -> Json<Vec<Value>> {
    let store = db.read().await;
    let scored = store
        .domains
        .values()
        .map(|d| (find_score(&d.title, &body.query), d.clone()))
        .collect();
    ranked_results(scored, &body)
}

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

async fn list_terms(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Value> {
    let store = db.read().await;
    let mut terms: Vec<Term> = store
        .terms
        .values()
        .filter(|t| query.layer_id.is_none_or(|layer_id| t.layer_id == layer_id))
        .filter(|t| query.domain_id.is_none_or(|domain_id| t.domain_id == domain_id))
        .cloned()
        .collect();
    match query.sort.as_deref() {
        Some("title") => terms.sort_by(|a, b| (&a.title, a.id).cmp(&(&b.title, b.id))),
        _ => terms.sort_by_key(|t| (t.created_at, t.id)),
    }
    Json(paginate(terms, &query))
}

async fn create_term(
    State(db): State<Db>,
    Json(input): Json<CreateTerm>,
) -> ApiResult<(StatusCode, Json<Term>)> {
    check_title(&input.title)?;
    if input.definition.is_empty() {
        return Err(validation_error(
            &["body", "definition"],
            "String should have at least 1 character",
        ));
    }
    let mut store = db.write().await;
    if !store.domains.contains_key(&input.domain_id) {
        return Err(bad_request("Domain does not exist."));
    }
    if !store.layers.contains_key(&input.layer_id) {
        return Err(bad_request("Layer does not exist."));
    }
    let term = Term {
        id: Uuid::new_v4(),
        domain_id: input.domain_id,
        layer_id: input.layer_id,
        title: input.title,
        definition: input.definition,
        parent_term_id: input.parent_term_id,
        version: 1,
        created_at: Utc::now(),
        last_modified: Some(Utc::now()),
    };
    store.terms.insert(term.id, term.clone());
    Ok((StatusCode::CREATED, Json(term)))
}

async fn get_term(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<Term>> {
    let store = db.read().await;
    store
        .terms
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Term not found."))
}

async fn update_term(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTerm>,
) -> ApiResult<Json<Term>> {
    if let Some(title) = &input.title {
        check_title(title)?;
    }
    let mut store = db.write().await;
    let term = store
        .terms
        .get_mut(&id)
        .ok_or_else(|| not_found("Term not found."))?;
    if let Some(title) = input.title {
        term.title = title;
    }
    if let Some(definition) = input.definition {
        term.definition = definition;
    }
    if let Some(parent_term_id) = input.parent_term_id {
        term.parent_term_id = Some(parent_term_id);
    }
    term.version += 1;
    term.last_modified = Some(Utc::now());
    Ok(Json(term.clone()))
}

/// Term deletion does not cascade to relationships: dangling edges mirror
/// the real server's observed behavior, which the client compensates for by
/// sweeping its Term cache broadly.
async fn delete_term(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store
        .terms
        .remove(&id)
        .ok_or_else(|| not_found("Term not found."))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_terms(State(db): State<Db>, Json(body): Json<FindBody>) -> Json<Vec<Value>> {
    let store = db.read().await;
    let scored = store
        .terms
        .values()
        .map(|t| (find_score(&t.title, &body.query), t.clone()))
        .collect();
    ranked_results(scored, &body)
}

// ---------------------------------------------------------------------------
// Term relationships (legacy bare-array listing)
// ---------------------------------------------------------------------------

fn relationship_out(rel: &TermRelationship, store: &Store) -> Value {
    let term_ref = |id: &Uuid| {
        store
            .terms
            .get(id)
            .map(|t| json!({ "id": t.id, "title": t.title }))
            .unwrap_or(Value::Null)
    };
    let mut value = serde_json::to_value(rel).unwrap_or_else(|_| json!({}));
    value["source_term"] = term_ref(&rel.source_term_id);
    value["target_term"] = term_ref(&rel.target_term_id);
    value
}

async fn list_relationships(
    State(db): State<Db>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Value>> {
    let store = db.read().await;
    let mut rels: Vec<&TermRelationship> = store
        .relationships
        .values()
        .filter(|r| query.source_term_id.is_none_or(|id| r.source_term_id == id))
        .filter(|r| query.target_term_id.is_none_or(|id| r.target_term_id == id))
        .filter(|r| {
            query
                .predicate
                .as_ref()
                .is_none_or(|p| &r.predicate == p)
        })
        .collect();
    rels.sort_by_key(|r| (r.created_at, r.id));
    let skip = query.skip.unwrap_or(0) as usize;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE) as usize;
    let out = rels
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(|r| relationship_out(r, &store))
        .collect();
    Json(out)
}

async fn create_relationship(
    State(db): State<Db>,
    Json(input): Json<CreateRelationship>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut store = db.write().await;
    if !store.terms.contains_key(&input.source_term_id)
        || !store.terms.contains_key(&input.target_term_id)
    {
        return Err(bad_request("Both term IDs must exist."));
    }
    if store.relationships.values().any(|r| {
        r.source_term_id == input.source_term_id
            && r.target_term_id == input.target_term_id
            && r.predicate == input.predicate
    }) {
        return Err(bad_request("Duplicate relationship."));
    }
    let rel = TermRelationship {
        id: Uuid::new_v4(),
        source_term_id: input.source_term_id,
        target_term_id: input.target_term_id,
        predicate: input.predicate,
        created_at: Utc::now(),
    };
    store.relationships.insert(rel.id, rel.clone());
    let out = relationship_out(&rel, &store);
    Ok((StatusCode::CREATED, Json(out)))
}

async fn get_relationship(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<Value>> {
    let store = db.read().await;
    let rel = store
        .relationships
        .get(&id)
        .ok_or_else(|| not_found("Relationship not found."))?;
    Ok(Json(relationship_out(rel, &store)))
}

async fn update_relationship(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateRelationship>,
) -> ApiResult<Json<Value>> {
    let mut store = db.write().await;
    let rel = store
        .relationships
        .get_mut(&id)
        .ok_or_else(|| not_found("Relationship not found."))?;
    rel.predicate = input.predicate;
    let rel = rel.clone();
    Ok(Json(relationship_out(&rel, &store)))
}

/// The real server answers relationship deletes with 200 and an empty body,
/// unlike the 204 of the entity endpoints.
async fn delete_relationship(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store
        .relationships
        .remove(&id)
        .ok_or_else(|| not_found("Relationship not found."))?;
    Ok(StatusCode::OK)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn layer(title: &str) -> Layer {
        Layer {
            id: Uuid::new_v4(),
            title: title.to_string(),
            definition: None,
            primary_predicate: None,
            version: 1,
            created_at: Utc::now(),
            last_modified: None,
        }
    }

    #[test]
    fn paginate_caps_limit_and_reports_total() {
        let items: Vec<u32> = (0..250).collect();
        let query = ListQuery {
            limit: Some(500),
            ..Default::default()
        };
        let envelope = paginate(items, &query);
        assert_eq!(envelope["total"], 250);
        assert_eq!(envelope["limit"], 100);
        assert_eq!(envelope["data"].as_array().unwrap().len(), 100);
    }

    #[test]
    fn paginate_windows_with_skip() {
        let items: Vec<u32> = (0..10).collect();
        let query = ListQuery {
            skip: Some(8),
            limit: Some(5),
            ..Default::default()
        };
        let envelope = paginate(items, &query);
        assert_eq!(envelope["data"].as_array().unwrap().len(), 2);
        assert_eq!(envelope["data"][0], 8);
        assert_eq!(envelope["skip"], 8);
    }

    #[test]
    fn layer_serializes_iso8601_timestamps() {
        let json = serde_json::to_value(layer("Foundations")).unwrap();
        let created_at = json["created_at"].as_str().unwrap();
        assert!(created_at.contains('T'), "expected ISO8601, got {created_at}");
    }

    #[test]
    fn find_score_ranks_exact_above_substring() {
        assert_eq!(find_score("Network", "network"), 1.0);
        assert_eq!(find_score("Network protocols", "network"), 0.7);
        assert_eq!(find_score("Storage", "network"), 0.0);
    }

    #[test]
    fn ranked_results_honor_threshold_and_limit() {
        let body = FindBody {
            query: String::new(),
            limit: Some(1),
            threshold: Some(0.5),
        };
        let Json(results) = ranked_results(
            vec![
                (0.9, json!({ "title": "a" })),
                (0.6, json!({ "title": "b" })),
                (0.2, json!({ "title": "c" })),
            ],
            &body,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["title"], "a");
        assert!(results[0]["score"].as_f64().unwrap() > 0.8);
    }

    #[test]
    fn validation_error_matches_fastapi_shape() {
        let (status, Json(body)) = validation_error(&["body", "title"], "field required");
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["loc"][1], "title");
        assert_eq!(body["detail"][0]["msg"], "field required");
    }
}
