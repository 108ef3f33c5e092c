//! Key-addressed cache of server responses with staleness windows.
//!
//! # Design
//! A cache entry is addressed by `(entity kind, scope)`. Scopes mirror the
//! views the services expose: a detail by id, a list under its canonical
//! parameter token, and the derived relationship views by term or predicate.
//! Values are stored as serialized JSON so one map serves every entity type.
//!
//! Two windows govern an entry's life: within `stale_time` a read is a hit;
//! between `stale_time` and `cache_time` the entry is a miss for reads (the
//! next fetch refreshes it) but still consultable via [`QueryCache::peek`],
//! which the delete paths use to compute targeted invalidation; past
//! `cache_time` the entry is evicted on access.
//!
//! The cache is shared mutable state behind a `parking_lot::RwLock`. It is
//! always injected into the client, never a global, so tests can swap it per
//! case. Locks are never held across an await point.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// The four cacheable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Layer,
    Domain,
    Term,
    Relationship,
}

/// The addressable view within an entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A list query under its canonical parameter token. Every distinct
    /// parameter combination is its own entry.
    List(String),
    /// A single entity by id.
    Detail(Uuid),
    /// Relationships touching a term as source or target, merged.
    ByTerm(Uuid),
    /// Relationships carrying a predicate.
    ByPredicate(String),
}

/// A cache key: entity kind plus scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: EntityKind,
    pub scope: Scope,
}

impl CacheKey {
    pub fn detail(kind: EntityKind, id: Uuid) -> Self {
        Self {
            kind,
            scope: Scope::Detail(id),
        }
    }

    pub fn list(kind: EntityKind, token: impl Into<String>) -> Self {
        Self {
            kind,
            scope: Scope::List(token.into()),
        }
    }

    pub fn by_term(term_id: Uuid) -> Self {
        Self {
            kind: EntityKind::Relationship,
            scope: Scope::ByTerm(term_id),
        }
    }

    pub fn by_predicate(predicate: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Relationship,
            scope: Scope::ByPredicate(predicate.into()),
        }
    }
}

struct CacheEntry {
    value: serde_json::Value,
    inserted_at: Instant,
}

/// Shared, injectable query cache.
///
/// Cloning is cheap and clones share the same underlying map.
#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    stale_time: Duration,
    cache_time: Duration,
}

impl QueryCache {
    pub fn new(stale_time: Duration, cache_time: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            stale_time,
            cache_time,
        }
    }

    /// Cache with the default 5-minute stale and 10-minute eviction windows.
    pub fn with_defaults() -> Self {
        Self::new(Duration::from_secs(5 * 60), Duration::from_secs(10 * 60))
    }

    /// Fresh read: a hit only within `stale_time`. Entries past `cache_time`
    /// are evicted on the way through.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            if let Some(entry) = entries.get(key) {
                let age = now.duration_since(entry.inserted_at);
                if age < self.stale_time {
                    return serde_json::from_value(entry.value.clone()).ok();
                }
                if age < self.cache_time {
                    return None;
                }
            } else {
                return None;
            }
        }
        debug!(?key, "evicting expired cache entry");
        self.entries.write().remove(key);
        None
    }

    /// Staleness-ignoring read, used by delete paths to recover the last
    /// known value for targeted invalidation. Honors `cache_time`.
    pub fn peek<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if Instant::now().duration_since(entry.inserted_at) >= self.cache_time {
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Store a value under a key, resetting its age.
    pub fn set<T: Serialize>(&self, key: CacheKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.entries.write().insert(
                    key,
                    CacheEntry {
                        value,
                        inserted_at: Instant::now(),
                    },
                );
            }
            Err(err) => debug!(%err, "dropping uncacheable value"),
        }
    }

    pub fn remove(&self, key: &CacheKey) {
        self.entries.write().remove(key);
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Drop every list entry of a kind. Detail and derived scopes survive.
    pub fn invalidate_lists(&self, kind: EntityKind) {
        debug!(?kind, "invalidating list scope");
        self.entries
            .write()
            .retain(|key, _| !(key.kind == kind && matches!(key.scope, Scope::List(_))));
    }

    /// Drop every entry of a kind, whatever its scope. The broad fallback
    /// used when a mutation does not carry enough information for targeted
    /// invalidation.
    pub fn invalidate_kind(&self, kind: EntityKind) {
        debug!(?kind, "invalidating entire kind");
        self.entries.write().retain(|key, _| key.kind != kind);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
