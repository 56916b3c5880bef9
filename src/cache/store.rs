//! Disk-backed cache for API responses
//!
//! Persists serialized JSON payloads with expiry timestamps to an
//! XDG-compliant cache directory (`~/.cache/forkful/` on Linux) so responses
//! survive process restarts. Reads classify records as fresh or stale instead
//! of dropping expired data, which backs the stale-fallback path once the
//! daily request quota runs out.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

/// Filename prefix namespacing API records within the cache directory.
const PERSIST_PREFIX: &str = "api-";

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct PersistedRecord<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// When the record expires
    expires_at: DateTime<Utc>,
}

/// Outcome of a disk-cache read.
///
/// Storage failures get their own variant rather than an error return, so
/// callers can treat them as a miss while tests can still tell "genuinely
/// absent" apart from "storage failed".
#[derive(Debug)]
pub enum StoreRead<T> {
    /// A record exists and its expiry lies in the future.
    Fresh(T),
    /// A record exists but has expired.
    Stale(T),
    /// No record exists for the key.
    Absent,
    /// The record could not be read or parsed.
    Failed(String),
}

impl<T> StoreRead<T> {
    /// The value, only if fresh.
    pub fn fresh(self) -> Option<T> {
        match self {
            StoreRead::Fresh(value) => Some(value),
            _ => None,
        }
    }

    /// The value regardless of expiry. Used for the quota-exhausted fallback.
    pub fn stale_ok(self) -> Option<T> {
        match self {
            StoreRead::Fresh(value) | StoreRead::Stale(value) => Some(value),
            _ => None,
        }
    }
}

/// Resolves the XDG-compliant cache directory for forkful.
///
/// Returns `None` if no home directory can be determined.
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "forkful").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Durable key-value cache over JSON files.
///
/// Writes are best-effort: callers swallow failures and continue without
/// persistence. Records are only ever overwritten by key, never evicted.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory where cache records are stored
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Creates a store in the default XDG cache directory.
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no
    /// home directory).
    pub fn new() -> Option<Self> {
        default_cache_dir().map(|cache_dir| Self { cache_dir })
    }

    /// Creates a store using a custom directory.
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path of the record for the given key
    fn record_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(file_name(key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Reads the record stored under `key`.
    ///
    /// A missing file is `Absent`; unreadable or unparseable records are
    /// `Failed` and logged at debug level, never propagated.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> StoreRead<T> {
        let path = self.record_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return StoreRead::Absent,
            Err(err) => {
                debug!(key, error = %err, "failed to read cache record");
                return StoreRead::Failed(err.to_string());
            }
        };

        let record: PersistedRecord<T> = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(err) => {
                debug!(key, error = %err, "failed to parse cache record");
                return StoreRead::Failed(err.to_string());
            }
        };

        if record.expires_at > Utc::now() {
            StoreRead::Fresh(record.data)
        } else {
            StoreRead::Stale(record.data)
        }
    }

    /// Writes `data` under `key` with the given time-to-live.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if directory creation, serialization, or file writing fails
    pub fn write<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        ttl: std::time::Duration,
    ) -> io::Result<()> {
        self.ensure_dir()?;

        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let record = PersistedRecord {
            data,
            cached_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(self.record_path(key), json)
    }
}

/// Maps a cache key to a filesystem-safe filename.
///
/// Keys are request paths with query strings; the readable head keeps records
/// inspectable while the hash suffix keeps distinct keys distinct.
fn file_name(key: &str) -> String {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);

    let safe: String = key
        .chars()
        .take(64)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    format!("{}{}-{:016x}.json", PERSIST_PREFIX, safe, hasher.finish())
}
