//! Recipe API client with caching and quota enforcement
//!
//! `RecipeClient` answers "fetch JSON for this resource" by checking the disk
//! cache, then the memory cache, then deduplicating concurrent identical
//! requests before spending daily quota on a network fetch. Successful fetches
//! are written through to both caches; once the daily ceiling is reached, an
//! expired disk record is preferred over failing outright.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

use crate::cache::{
    build_cache_key, default_cache_dir, CacheStore, QuotaGovernor, TtlCache, DEFAULT_TTL,
};
use crate::config::Config;

use super::types::{IngredientMatch, Recipe, SearchResults};

/// Search endpoint path
const SEARCH_PATH: &str = "/recipes/complexSearch";

/// Pantry-match endpoint path
const PANTRY_PATH: &str = "/recipes/findByIngredients";

/// Default memory-cache lifetime for fetched responses: 30 minutes.
const DEFAULT_MEMORY_TTL: Duration = Duration::from_secs(30 * 60);

/// Default disk-cache lifetime for fetched responses: 12 hours.
const DEFAULT_PERSIST_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Memory-cache lifetime for pantry matches: 6 hours.
const PANTRY_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Cache lifetime for per-recipe details, which rarely change: 24 hours.
const DETAIL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors that can occur when fetching from the recipe API
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// HTTP transport failed before a status was available
    #[error("HTTP request failed: {0}")]
    Request(#[source] Arc<reqwest::Error>),

    /// The origin answered with a non-success status
    #[error("recipe API returned HTTP {0}")]
    Status(StatusCode),

    /// The response body was not the expected JSON
    #[error("failed to parse API response: {0}")]
    Decode(#[source] Arc<serde_json::Error>),

    /// The request URL could not be assembled
    #[error("invalid request URL: {0}")]
    Url(String),

    /// Daily ceiling reached with no stale record to fall back on
    #[error("daily API quota reached, please try again tomorrow")]
    QuotaExceeded,
}

/// Cache and quota knobs for a single fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Memory-cache lifetime for the fetched value
    pub ttl: Duration,
    /// Whether to write the value through to the disk cache
    pub persist: bool,
    /// Disk-cache lifetime
    pub persist_ttl: Duration,
    /// Skip both cache reads and always consult the origin
    pub bypass_cache: bool,
    /// Skip the daily quota check
    pub bypass_quota: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_MEMORY_TTL,
            persist: true,
            persist_ttl: DEFAULT_PERSIST_TTL,
            bypass_cache: false,
            bypass_quota: false,
        }
    }
}

/// Parameters for a cuisine or free-text recipe search.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Free-text query, e.g. "pasta"
    pub query: Option<String>,
    /// Cuisine filter, e.g. "Italian"
    pub cuisine: Option<String>,
    /// Result ordering, e.g. "popularity"
    pub sort: Option<String>,
    /// Page size
    pub number: u32,
    /// Page offset
    pub offset: u32,
    /// Skip cache reads for a forced refetch
    pub bypass_cache: bool,
    /// Memory-cache lifetime override
    pub ttl: Option<Duration>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: None,
            cuisine: None,
            sort: None,
            number: 6,
            offset: 0,
            bypass_cache: false,
            ttl: None,
        }
    }
}

/// Parameters for matching recipes against pantry ingredients.
#[derive(Debug, Clone)]
pub struct PantryParams {
    /// Ingredients on hand
    pub ingredients: Vec<String>,
    /// Maximum matches to return
    pub number: u32,
    /// 1 maximizes used ingredients, 2 minimizes missing ones
    pub ranking: u8,
    /// Skip staples like salt, flour, and water when counting misses
    pub ignore_pantry: bool,
    /// Skip cache reads for a forced refetch
    pub bypass_cache: bool,
    /// Memory-cache lifetime override
    pub ttl: Option<Duration>,
}

impl Default for PantryParams {
    fn default() -> Self {
        Self {
            ingredients: Vec::new(),
            number: 6,
            ranking: 1,
            ignore_pantry: true,
            bypass_cache: false,
            ttl: None,
        }
    }
}

/// Parameters for a single-recipe details lookup.
#[derive(Debug, Clone, Default)]
pub struct DetailParams {
    /// Skip cache reads for a forced refetch
    pub bypass_cache: bool,
    /// Memory-cache lifetime override
    pub ttl: Option<Duration>,
}

/// Client for the recipe API, fronted by the caching and quota layer.
///
/// Constructed once at startup and shared by reference; the caches it owns
/// are handles over shared state, so cloning the client is also cheap.
#[derive(Debug, Clone)]
pub struct RecipeClient {
    http: Client,
    config: Config,
    memory: TtlCache<Value, FetchError>,
    store: Option<CacheStore>,
    quota: Option<QuotaGovernor>,
}

impl RecipeClient {
    /// Creates a client caching under the default XDG cache directory.
    ///
    /// Falls back to memory-only operation when no cache directory can be
    /// resolved; without durable storage the daily quota cannot be tracked
    /// and is not enforced.
    pub fn new(config: Config) -> Self {
        match default_cache_dir() {
            Some(dir) => Self::with_cache_dir(config, dir),
            None => Self::memory_only(config),
        }
    }

    /// Creates a client storing cache records and quota usage under `dir`.
    pub fn with_cache_dir(config: Config, dir: PathBuf) -> Self {
        let quota = QuotaGovernor::new(dir.join("usage.json"), config.daily_limit);
        Self {
            http: Client::new(),
            memory: TtlCache::new(DEFAULT_TTL),
            store: Some(CacheStore::with_dir(dir)),
            quota: Some(quota),
            config,
        }
    }

    /// Creates a client with no durable storage.
    pub fn memory_only(config: Config) -> Self {
        Self {
            http: Client::new(),
            memory: TtlCache::new(DEFAULT_TTL),
            store: None,
            quota: None,
            config,
        }
    }

    /// Today's request count and the daily ceiling, when quota tracking is
    /// active.
    pub fn usage(&self) -> Option<(u32, u32)> {
        self.quota
            .as_ref()
            .map(|quota| (quota.current_count(), quota.daily_limit()))
    }

    /// Searches recipes by cuisine, free-text query, or both.
    pub async fn search_recipes(&self, params: &SearchParams) -> Result<SearchResults, FetchError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if params.number > 0 {
            query.push(("number", params.number.to_string()));
        }
        if params.offset > 0 {
            query.push(("offset", params.offset.to_string()));
        }
        if let Some(cuisine) = &params.cuisine {
            query.push(("cuisine", cuisine.clone()));
        }
        if let Some(text) = &params.query {
            query.push(("query", text.clone()));
        }
        if let Some(sort) = &params.sort {
            query.push(("sort", sort.clone()));
        }

        let opts = FetchOptions {
            ttl: params.ttl.unwrap_or(DEFAULT_MEMORY_TTL),
            bypass_cache: params.bypass_cache,
            ..FetchOptions::default()
        };

        let value = self.cached_json_get(SEARCH_PATH, &query, opts).await?;
        serde_json::from_value(value).map_err(|err| FetchError::Decode(Arc::new(err)))
    }

    /// Finds recipes that use the given pantry ingredients.
    pub async fn find_by_ingredients(
        &self,
        params: &PantryParams,
    ) -> Result<Vec<IngredientMatch>, FetchError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        let ingredients = params.ingredients.join(",");
        if !ingredients.is_empty() {
            query.push(("ingredients", ingredients));
        }
        if params.number > 0 {
            query.push(("number", params.number.to_string()));
        }
        if params.ranking > 0 {
            query.push(("ranking", params.ranking.to_string()));
        }
        query.push(("ignorePantry", params.ignore_pantry.to_string()));

        let opts = FetchOptions {
            ttl: params.ttl.unwrap_or(PANTRY_TTL),
            bypass_cache: params.bypass_cache,
            ..FetchOptions::default()
        };

        let value = self.cached_json_get(PANTRY_PATH, &query, opts).await?;
        serde_json::from_value(value).map_err(|err| FetchError::Decode(Arc::new(err)))
    }

    /// Fetches full details for one recipe.
    pub async fn recipe_information(
        &self,
        id: u64,
        params: &DetailParams,
    ) -> Result<Recipe, FetchError> {
        let path = format!("/recipes/{}/information", id);

        let opts = FetchOptions {
            ttl: params.ttl.unwrap_or(DETAIL_TTL),
            persist_ttl: DETAIL_TTL,
            bypass_cache: params.bypass_cache,
            ..FetchOptions::default()
        };

        let value = self.cached_json_get(&path, &[], opts).await?;
        serde_json::from_value(value).map_err(|err| FetchError::Decode(Arc::new(err)))
    }

    /// Fetches JSON for a resource through the cache and quota policy.
    ///
    /// Lookup order: fresh disk record, fresh memory entry, then a
    /// deduplicated origin fetch. A fetch that fails on quota is answered
    /// with a stale disk record when one exists; the stale value goes
    /// straight to the caller without refreshing the memory cache, so the
    /// next call re-runs the quota check.
    pub(crate) async fn cached_json_get(
        &self,
        path: &str,
        params: &[(&str, String)],
        opts: FetchOptions,
    ) -> Result<Value, FetchError> {
        let key = build_cache_key(path, params);

        if !opts.bypass_cache {
            if let Some(store) = &self.store {
                if let Some(value) = store.read::<Value>(&key).fresh() {
                    trace!(%key, "disk cache hit");
                    return Ok(value);
                }
            }
            if let Some(value) = self.memory.get(&key) {
                trace!(%key, "memory cache hit");
                return Ok(value);
            }
        }

        let url = self.request_url(path, params)?;
        let http = self.http.clone();
        let store = self.store.clone();
        let quota = self.quota.clone();
        let fetch_key = key.clone();

        let result = self
            .memory
            .dedupe(
                &key,
                move || fetch_origin(http, url, store, quota, fetch_key, opts),
                Some(opts.ttl),
            )
            .await;

        match result {
            Err(FetchError::QuotaExceeded) => {
                if let Some(store) = &self.store {
                    if let Some(stale) = store.read::<Value>(&key).stale_ok() {
                        debug!(%key, "daily quota reached, serving stale cached response");
                        return Ok(stale);
                    }
                }
                Err(FetchError::QuotaExceeded)
            }
            other => other,
        }
    }

    /// Assembles the request URL, credentials included.
    fn request_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
        let mut url = Url::parse(&format!("{}{}", self.config.base_url, path))
            .map_err(|err| FetchError::Url(err.to_string()))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("apiKey", &self.config.api_key);
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }

        Ok(url)
    }
}

/// Performs the actual origin fetch behind the dedupe layer.
///
/// Quota is checked strictly before the network call and incremented only
/// after a successful response, so cache hits and fallbacks never consume
/// quota. Disk-persist failures are swallowed; durability is best-effort.
async fn fetch_origin(
    http: Client,
    url: Url,
    store: Option<CacheStore>,
    quota: Option<QuotaGovernor>,
    key: String,
    opts: FetchOptions,
) -> Result<Value, FetchError> {
    if !opts.bypass_quota {
        if let Some(quota) = &quota {
            if quota.is_exceeded() {
                return Err(FetchError::QuotaExceeded);
            }
        }
    }

    debug!(%key, "fetching from origin");
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|err| FetchError::Request(Arc::new(err)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let text = response
        .text()
        .await
        .map_err(|err| FetchError::Request(Arc::new(err)))?;
    let value: Value =
        serde_json::from_str(&text).map_err(|err| FetchError::Decode(Arc::new(err)))?;

    if opts.persist {
        if let Some(store) = &store {
            if let Err(err) = store.write(&key, &value, opts.persist_ttl) {
                debug!(%key, error = %err, "failed to persist API response");
            }
        }
    }

    if let Some(quota) = &quota {
        quota.increment();
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn test_client() -> RecipeClient {
        RecipeClient::memory_only(Config::new("test-key"))
    }

    #[test]
    fn test_request_url_carries_api_key_and_params() {
        let client = test_client();
        let url = client
            .request_url(
                SEARCH_PATH,
                &[("cuisine", "Italian".to_string()), ("number", "6".to_string())],
            )
            .unwrap();

        assert_eq!(url.path(), "/recipes/complexSearch");
        let query = url.query().unwrap();
        assert!(query.contains("apiKey=test-key"));
        assert!(query.contains("cuisine=Italian"));
        assert!(query.contains("number=6"));
    }

    #[test]
    fn test_request_url_encodes_reserved_characters() {
        let client = test_client();
        let url = client
            .request_url(PANTRY_PATH, &[("ingredients", "tomato,basil".to_string())])
            .unwrap();

        assert!(url.query().unwrap().contains("ingredients=tomato%2Cbasil"));
    }

    #[test]
    fn test_fetch_options_defaults() {
        let opts = FetchOptions::default();
        assert_eq!(opts.ttl, Duration::from_secs(30 * 60));
        assert!(opts.persist);
        assert_eq!(opts.persist_ttl, Duration::from_secs(12 * 60 * 60));
        assert!(!opts.bypass_cache);
        assert!(!opts.bypass_quota);
    }

    #[test]
    fn test_search_params_default_page() {
        let params = SearchParams::default();
        assert_eq!(params.number, 6);
        assert_eq!(params.offset, 0);
        assert!(!params.bypass_cache);
    }

    #[test]
    fn test_pantry_params_defaults() {
        let params = PantryParams::default();
        assert_eq!(params.number, 6);
        assert_eq!(params.ranking, 1);
        assert!(params.ignore_pantry);
    }

    #[test]
    fn test_quota_error_message_is_user_facing() {
        let message = FetchError::QuotaExceeded.to_string();
        assert!(message.contains("try again tomorrow"));
    }

    #[test]
    fn test_usage_unavailable_without_storage() {
        assert!(test_client().usage().is_none());
    }

    #[tokio::test]
    async fn test_bypass_quota_fetches_despite_exhausted_ceiling() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let body = r#"{"ok":true}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
        });

        let temp = tempfile::TempDir::new().unwrap();
        let quota = QuotaGovernor::new(temp.path().join("usage.json"), 0);
        assert!(quota.is_exceeded());

        let opts = FetchOptions {
            bypass_quota: true,
            ..FetchOptions::default()
        };
        let url = Url::parse(&format!("http://{}/recipes/complexSearch", addr)).unwrap();
        let value = fetch_origin(
            Client::new(),
            url,
            None,
            Some(quota.clone()),
            "key".to_string(),
            opts,
        )
        .await
        .expect("Bypass fetch should succeed");

        assert_eq!(value["ok"], true);
        // A bypassed check still records the real request
        assert_eq!(quota.current_count(), 1);
    }
}
