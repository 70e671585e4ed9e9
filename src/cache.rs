//! Time-based cache for feed responses and parsed titles.
//!
//! The whole cache is one serializable value, stored as a single JSON
//! document. Timestamps are milliseconds since the Unix epoch and are always
//! supplied by the caller.

use crate::domain::ParsedTitle;
use crate::error::{DealError, DealResult};
use crate::feed::Deal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// How long a feed response stays valid.
pub const RESPONSE_CACHE_TTL_MS: u64 = 15 * 60 * 1000;

/// How long a parsed title stays valid.
pub const TITLE_CACHE_TTL_MS: u64 = 72 * 60 * 60 * 1000;

/// Cached deals for one feed mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub data: Vec<Deal>,
    pub timestamp: u64,
}

/// Cached parse of one raw title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTitle {
    pub parsed: ParsedTitle,
    pub timestamp: u64,
}

/// Response cache keyed by feed mode plus title cache keyed by raw title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealCache {
    #[serde(default)]
    pub response_cache: BTreeMap<String, CachedResponse>,
    #[serde(default)]
    pub title_cache: BTreeMap<String, CachedTitle>,
}

fn is_fresh(timestamp: u64, ttl: u64, now: u64) -> bool {
    now.saturating_sub(timestamp) < ttl
}

impl DealCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a cache file. A missing file yields an empty cache.
    pub fn load(path: &Path) -> DealResult<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cache file, starting empty");
                return Ok(Self::default());
            }
            Err(err) => return Err(DealError::io(path, err)),
        };

        serde_json::from_str(&data).map_err(|source| DealError::CacheFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> DealResult<()> {
        let data = serde_json::to_string(self)?;
        std::fs::write(path, data).map_err(|err| DealError::io(path, err))
    }

    /// Cached deals for `mode`, if still valid at `now`.
    pub fn response(&self, mode: &str, now: u64) -> Option<&[Deal]> {
        self.response_cache
            .get(mode)
            .filter(|entry| is_fresh(entry.timestamp, RESPONSE_CACHE_TTL_MS, now))
            .map(|entry| entry.data.as_slice())
    }

    /// Cached parse of `title`, if still valid at `now`.
    pub fn title(&self, title: &str, now: u64) -> Option<&ParsedTitle> {
        self.title_cache
            .get(title)
            .filter(|entry| is_fresh(entry.timestamp, TITLE_CACHE_TTL_MS, now))
            .map(|entry| &entry.parsed)
    }

    pub fn put_response(&mut self, mode: impl Into<String>, data: Vec<Deal>, now: u64) {
        self.response_cache.insert(
            mode.into(),
            CachedResponse {
                data,
                timestamp: now,
            },
        );
    }

    pub fn put_title(&mut self, title: impl Into<String>, parsed: ParsedTitle, now: u64) {
        self.title_cache.insert(
            title.into(),
            CachedTitle {
                parsed,
                timestamp: now,
            },
        );
    }

    /// Drops every entry that is no longer valid at `now`. Returns the
    /// number of entries removed.
    pub fn clean_expired(&mut self, now: u64) -> usize {
        let before = self.len();
        self.response_cache
            .retain(|_, entry| is_fresh(entry.timestamp, RESPONSE_CACHE_TTL_MS, now));
        self.title_cache
            .retain(|_, entry| is_fresh(entry.timestamp, TITLE_CACHE_TTL_MS, now));

        let removed = before - self.len();
        if removed > 0 {
            debug!(removed, "evicted expired cache entries");
        }
        removed
    }

    /// Total number of entries across both caches.
    pub fn len(&self) -> usize {
        self.response_cache.len() + self.title_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
