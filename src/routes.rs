use once_cell::sync::Lazy;
use reqwest::Url;

use crate::cache::normalize_query;

/// Canonical URL scheme for the search surface: a `/search` path carrying
/// the query as a `serviceDescription` parameter. Earlier path-segment and
/// SEO-slug schemes are historical variants and are not parsed here.
pub const SEARCH_PATH: &str = "/search";
pub const QUERY_PARAM: &str = "serviceDescription";

// Url cannot represent app-relative locations on its own, so build and
// parse against a fixed placeholder origin.
static BASE: Lazy<Url> = Lazy::new(|| {
    Url::parse("http://localhost").expect("placeholder base url is valid")
});

/// Build the visible address for a query, e.g.
/// `/search?serviceDescription=sprzeda%C5%BC+odzie%C5%BCy`.
pub fn search_url(query: &str) -> String {
    let mut url = BASE.clone();
    url.set_path(SEARCH_PATH);
    url.query_pairs_mut().append_pair(QUERY_PARAM, query);
    format!("{}?{}", url.path(), url.query().unwrap_or_default())
}

/// Extract the query from a location string, which may be app-relative
/// (`/search?serviceDescription=...`) or absolute. Returns the normalized
/// query, or None when the location is not a search address or carries an
/// empty query.
pub fn parse_search_url(location: &str) -> Option<String> {
    let url = Url::parse(location)
        .or_else(|_| BASE.join(location))
        .ok()?;
    if url.path() != SEARCH_PATH {
        return None;
    }
    let (_, value) = url.query_pairs().find(|(key, _)| key == QUERY_PARAM)?;
    let query = normalize_query(&value);
    if query.is_empty() { None } else { Some(query) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_round_trips_through_parse() {
        let url = search_url("sprzedaż odzieży");
        assert!(url.starts_with("/search?serviceDescription="));
        assert_eq!(parse_search_url(&url).as_deref(), Some("sprzedaż odzieży"));
    }

    #[test]
    fn parse_accepts_absolute_locations() {
        let query = parse_search_url("https://example.com/search?serviceDescription=fryzjerstwo");
        assert_eq!(query.as_deref(), Some("fryzjerstwo"));
    }

    #[test]
    fn parse_rejects_other_paths() {
        assert!(parse_search_url("/").is_none());
        assert!(parse_search_url("/przyklady").is_none());
        assert!(parse_search_url("/szukaj/fryzjerstwo").is_none());
    }

    #[test]
    fn parse_rejects_missing_or_empty_query() {
        assert!(parse_search_url("/search").is_none());
        assert!(parse_search_url("/search?serviceDescription=").is_none());
        assert!(parse_search_url("/search?serviceDescription=%20%20").is_none());
    }

    #[test]
    fn parse_decodes_plus_and_percent_escapes() {
        let query = parse_search_url("/search?serviceDescription=sprzeda%C5%BC+odzie%C5%BCy");
        assert_eq!(query.as_deref(), Some("sprzedaż odzieży"));
    }
}
