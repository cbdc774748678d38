use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::models::SearchResults;

/// Store keys as constants for consistency
pub mod keys {
    /// Last searched query text.
    pub const QUERY: &str = "pkd-search-query";
    /// Last search results, serialized as JSON.
    pub const RESULTS: &str = "pkd-search-results";
    /// Flag set by the host when the page was restored from history
    /// navigation rather than freshly loaded.
    pub const RESTORED: &str = "bfcache-restored";
}

/// Session-scoped key-value store capability.
///
/// Everything here is best-effort: a store may be unavailable or over quota
/// at any time, so failures are expressed in the return types and callers
/// must treat persistence as optional. Nothing in the search flow may block
/// on or fail because of this store.
pub trait SessionStore: Send + Sync {
    fn try_read(&self, key: &str) -> Option<String>;
    /// Returns false when the write was not persisted.
    fn try_write(&self, key: &str, value: &str) -> bool;
    /// Returns true when an entry was removed.
    fn try_remove(&self, key: &str) -> bool;
}

/// In-process session store. Contents live exactly as long as the process,
/// which is the closest analogue of a browser tab's session storage.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: DashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> MemorySessionStore {
        MemorySessionStore {
            entries: DashMap::new(),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn try_read(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn try_write(&self, key: &str, value: &str) -> bool {
        self.entries.insert(key.to_string(), value.to_string());
        true
    }

    fn try_remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}

/// The last query/results pair persisted for restoration after a full page
/// reload triggered by history navigation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub query: String,
    pub results: SearchResults,
}

/// Persist the latest query/results pair. Best-effort; storage errors are
/// swallowed per the store contract.
pub fn save_snapshot(store: &dyn SessionStore, query: &str, results: &SearchResults) {
    if !store.try_write(keys::QUERY, query) {
        tracing::debug!(%query, "session store rejected query write");
        return;
    }
    match serde_json::to_string(results) {
        Ok(serialized) => {
            if !store.try_write(keys::RESULTS, &serialized) {
                tracing::debug!(%query, "session store rejected results write");
            }
        }
        Err(e) => tracing::debug!(error = %e, "could not serialize results for snapshot"),
    }
}

/// Read back the persisted snapshot. Returns None when either key is absent
/// or the serialized results no longer parse; a malformed snapshot is
/// treated the same as no snapshot at all.
pub fn load_snapshot(store: &dyn SessionStore) -> Option<Snapshot> {
    let query = store.try_read(keys::QUERY)?;
    let raw = store.try_read(keys::RESULTS)?;
    match serde_json::from_str(&raw) {
        Ok(results) => Some(Snapshot { query, results }),
        Err(e) => {
            tracing::debug!(error = %e, "discarding malformed restoration snapshot");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PkdCode, PkdPayload};

    fn sample_results() -> SearchResults {
        let record = PkdCode::new(
            "r1",
            1,
            0.88,
            PkdPayload {
                grupa_klasa_podklasa: "96.02.Z".to_string(),
                nazwa_grupowania: "Fryzjerstwo i pozostałe zabiegi kosmetyczne".to_string(),
                opis_dodatkowy: "Obejmuje: usługi fryzjerskie".to_string(),
            },
        );
        SearchResults {
            ai_suggestion: record.clone(),
            pkd_code_data: vec![record],
        }
    }

    #[test]
    fn memory_store_read_write_remove() {
        let store = MemorySessionStore::new();
        assert!(store.try_read("missing").is_none());

        assert!(store.try_write("k", "v"));
        assert_eq!(store.try_read("k").as_deref(), Some("v"));

        assert!(store.try_remove("k"));
        assert!(!store.try_remove("k"));
        assert!(store.try_read("k").is_none());
    }

    #[test]
    fn snapshot_round_trips() {
        let store = MemorySessionStore::new();
        let results = sample_results();

        save_snapshot(&store, "fryzjerstwo", &results);
        let snapshot = load_snapshot(&store).expect("snapshot should load");

        assert_eq!(snapshot.query, "fryzjerstwo");
        assert_eq!(snapshot.results, results);
    }

    #[test]
    fn absent_snapshot_loads_none() {
        let store = MemorySessionStore::new();
        assert!(load_snapshot(&store).is_none());

        // Query without results is not a snapshot either.
        store.try_write(keys::QUERY, "fryzjerstwo");
        assert!(load_snapshot(&store).is_none());
    }

    #[test]
    fn malformed_snapshot_loads_none() {
        let store = MemorySessionStore::new();
        store.try_write(keys::QUERY, "fryzjerstwo");
        store.try_write(keys::RESULTS, "{not json");
        assert!(load_snapshot(&store).is_none());
    }
}
