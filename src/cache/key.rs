//! Deterministic cache keys for API requests
//!
//! Two logically identical requests must always map to the same key, no matter
//! the order their query parameters were assembled in.

/// Builds the cache key for a request path and its query parameters.
///
/// Parameters are serialized sorted by name, so `a=1&b=2` and `b=2&a=1`
/// produce identical keys. Credentials appended at request time are not part
/// of the key.
pub fn build_cache_key(path: &str, params: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(&b.1)));

    let query: Vec<String> = sorted
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();

    format!("{}::{}", path, query.join("&"))
}
