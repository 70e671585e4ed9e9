//! Deals request handling.
//!
//! [`DealService`] answers one request for a feed mode: serve a fresh cached
//! response if there is one, otherwise read the feed, parse each title
//! (through the title cache) and store the result.

use crate::cache::DealCache;
use crate::domain::{ParsedTitle, TitleParser};
use crate::error::{DealError, DealResult};
use crate::feed::{parse_feed, Deal, DEFAULT_ITEM_LIMIT};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, trace};

/// Feed mode used when none is requested.
pub const DEFAULT_MODE: &str = "popdeals";

/// Supplies raw feed documents.
pub trait FeedSource: Send + Sync {
    /// Returns the feed document for `mode`.
    fn fetch(&self, mode: &str) -> DealResult<String>;

    /// Returns a human-readable name for this source.
    fn name(&self) -> &str;
}

/// Reads the feed from a file, ignoring the mode.
#[derive(Debug, Clone)]
pub struct FileFeedSource {
    path: PathBuf,
}

impl FileFeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FeedSource for FileFeedSource {
    fn fetch(&self, _mode: &str) -> DealResult<String> {
        std::fs::read_to_string(&self.path).map_err(|err| DealError::io(&self.path, err))
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Serves a feed document held in memory.
#[derive(Debug, Clone)]
pub struct StaticFeedSource {
    document: String,
}

impl StaticFeedSource {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

impl FeedSource for StaticFeedSource {
    fn fetch(&self, _mode: &str) -> DealResult<String> {
        Ok(self.document.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Parameters of a deals request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealRequest {
    pub mode: String,
    pub bypass_response_cache: bool,
    pub bypass_title_cache: bool,
    pub limit: usize,
}

impl Default for DealRequest {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE.to_string(),
            bypass_response_cache: false,
            bypass_title_cache: false,
            limit: DEFAULT_ITEM_LIMIT,
        }
    }
}

impl DealRequest {
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            ..Default::default()
        }
    }
}

/// Whether a response was served from the response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => f.write_str("HIT"),
            Self::Miss => f.write_str("MISS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealResponse {
    pub deals: Vec<Deal>,
    pub cache_status: CacheStatus,
    /// Titles run through the parser rather than taken from the cache.
    pub titles_parsed: usize,
}

/// Builds deal listings from a feed source.
pub struct DealService {
    source: Box<dyn FeedSource>,
    parser: TitleParser,
}

impl DealService {
    pub fn new(source: Box<dyn FeedSource>) -> Self {
        Self {
            source,
            parser: TitleParser::new(),
        }
    }

    /// Answers `request`, reading and updating `cache`.
    ///
    /// On a miss the cache is pruned of expired entries before returning, so
    /// callers that persist it only write live entries.
    pub fn ingest(
        &self,
        request: &DealRequest,
        cache: &mut DealCache,
        now: u64,
    ) -> DealResult<DealResponse> {
        if request.mode.trim().is_empty() {
            return Err(DealError::InvalidInput {
                parameter: "mode".to_string(),
                reason: "feed mode must not be empty".to_string(),
            });
        }

        if !request.bypass_response_cache {
            if let Some(deals) = cache.response(&request.mode, now) {
                info!(mode = %request.mode, deals = deals.len(), "response cache hit");
                return Ok(DealResponse {
                    deals: deals.to_vec(),
                    cache_status: CacheStatus::Hit,
                    titles_parsed: 0,
                });
            }
        }

        debug!(mode = %request.mode, source = self.source.name(), "fetching feed");
        let document = self.source.fetch(&request.mode)?;
        let items = parse_feed(&document, request.limit)?;

        let mut resolved: HashMap<String, ParsedTitle> = HashMap::new();
        let mut titles_parsed = 0;
        for item in &items {
            if resolved.contains_key(&item.title) {
                continue;
            }

            let cached = if request.bypass_title_cache {
                None
            } else {
                cache.title(&item.title, now).cloned()
            };

            let parsed = match cached {
                Some(parsed) => parsed,
                None => {
                    let result = self.parser.trace(&item.title);
                    trace!(
                        title = %item.title,
                        trailing = ?result.trailing_rules,
                        price = ?result.price_rule,
                        post_price = ?result.post_price_rule,
                        "parsed title"
                    );
                    cache.put_title(item.title.clone(), result.parsed.clone(), now);
                    titles_parsed += 1;
                    result.parsed
                }
            };
            resolved.insert(item.title.clone(), parsed);
        }

        let deals: Vec<Deal> = items
            .into_iter()
            .map(|item| {
                let parsed = resolved.get(&item.title).cloned().unwrap_or_default();
                Deal::from_parts(item, &parsed)
            })
            .collect();

        cache.put_response(request.mode.clone(), deals.clone(), now);
        cache.clean_expired(now);

        info!(
            mode = %request.mode,
            deals = deals.len(),
            titles_parsed,
            "response cache miss"
        );

        Ok(DealResponse {
            deals,
            cache_status: CacheStatus::Miss,
            titles_parsed,
        })
    }
}
