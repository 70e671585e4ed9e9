//! Deal listing title parser and deals-feed reader.
//!
//! Deal titles pack a product description, an offer and a handful of
//! qualifiers into one line of free text. This library splits them apart
//! with ordered, anchored pattern rules, and wraps the parser in the pieces
//! a deals listing needs: an RSS feed reader, a TTL cache and a service that
//! ties them together.
//!
//! # Architecture
//!
//! - [`domain`]: Title parsing and its rule tables
//! - [`feed`]: RSS item extraction
//! - [`cache`]: Response and title caches with expiry
//! - [`service`]: Request handling over a pluggable feed source
//! - [`error`]: Error handling for the I/O-facing layers
//!
//! # Quick Start
//!
//! ```
//! use dealparse::parse_title;
//!
//! let parsed = parse_title(
//!     "Sony WH-1000XM4 Wireless Headphones (3 Colors) $160 + Free Shipping",
//! );
//! assert_eq!(parsed.name, "Sony WH-1000XM4 Wireless Headphones (3 Colors)");
//! assert_eq!(parsed.price, "$160");
//! assert_eq!(parsed.note, "+ Free Shipping");
//! ```
//!
//! # Examples
//!
//! ## Serving a Feed
//!
//! ```
//! use dealparse::{CacheStatus, DealCache, DealRequest, DealService, StaticFeedSource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let feed = "<rss><channel><item><title>Warhammer: Vermintide 2 Free</title></item></channel></rss>";
//! let service = DealService::new(Box::new(StaticFeedSource::new(feed)));
//! let mut cache = DealCache::new();
//!
//! let first = service.ingest(&DealRequest::default(), &mut cache, 0)?;
//! assert_eq!(first.cache_status, CacheStatus::Miss);
//! assert_eq!(first.deals[0].price.as_deref(), Some("Free"));
//!
//! let second = service.ingest(&DealRequest::default(), &mut cache, 1_000)?;
//! assert_eq!(second.cache_status, CacheStatus::Hit);
//! # Ok(())
//! # }
//! ```

// Public API
pub mod cache;
pub mod domain;
pub mod error;
pub mod feed;
pub mod service;

// Re-exports for convenient access
pub use cache::{DealCache, RESPONSE_CACHE_TTL_MS, TITLE_CACHE_TTL_MS};
pub use domain::{parse_title, ParseTrace, ParsedTitle, PatternRule, TitleParser};
pub use error::{DealError, DealResult};
pub use feed::{parse_feed, Deal, DealContent, FeedItem, DEFAULT_ITEM_LIMIT};
pub use service::{
    CacheStatus, DealRequest, DealResponse, DealService, FeedSource, FileFeedSource,
    StaticFeedSource, DEFAULT_MODE,
};
