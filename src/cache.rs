use dashmap::DashMap;

use crate::models::SearchResults;

/// Normalize a raw query for use as a cache key and request parameter.
/// Trimming is the only transformation; lookups are exact-match.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_string()
}

/// In-memory mapping from normalized query to the last fetched results.
///
/// No TTL, no size bound. Entries live for the lifetime of the process and
/// `put` always overwrites. The cache is consulted before any network call
/// and again on navigation events so a back/forward hop never refetches.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: DashMap<String, SearchResults>,
}

impl QueryCache {
    pub fn new() -> QueryCache {
        QueryCache {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, query: &str) -> Option<SearchResults> {
        self.entries.get(query).map(|entry| entry.value().clone())
    }

    pub fn put(&self, query: &str, results: SearchResults) {
        self.entries.insert(query.to_string(), results);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PkdCode, PkdPayload};

    fn results(code: &str, score: f64) -> SearchResults {
        let record = PkdCode::new(
            code,
            1,
            score,
            PkdPayload {
                grupa_klasa_podklasa: code.to_string(),
                nazwa_grupowania: "Testowa działalność".to_string(),
                opis_dodatkowy: String::new(),
            },
        );
        SearchResults {
            ai_suggestion: record.clone(),
            pkd_code_data: vec![record],
        }
    }

    #[test]
    fn miss_returns_none() {
        let cache = QueryCache::new();
        assert!(cache.get("fryzjerstwo").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = QueryCache::new();
        let r = results("96.02.Z", 0.9);
        cache.put("fryzjerstwo", r.clone());

        assert_eq!(cache.get("fryzjerstwo"), Some(r));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_overwrites_existing_entry() {
        let cache = QueryCache::new();
        cache.put("fryzjerstwo", results("96.02.Z", 0.5));
        cache.put("fryzjerstwo", results("96.02.Z", 0.9));

        assert_eq!(cache.len(), 1);
        let got = cache.get("fryzjerstwo").unwrap();
        assert_eq!(got.ai_suggestion.score, 0.9);
    }

    #[test]
    fn lookup_is_exact_match() {
        let cache = QueryCache::new();
        cache.put("fryzjerstwo", results("96.02.Z", 0.9));
        assert!(cache.get("Fryzjerstwo").is_none());
        assert!(cache.get("fryzjerstwo ").is_none());
    }

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(normalize_query("  sprzedaż odzieży \n"), "sprzedaż odzieży");
        assert_eq!(normalize_query("   \t"), "");
    }
}
