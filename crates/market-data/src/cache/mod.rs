//! Time-based caching for market data.
//!
//! - `TtlCache` - generic thread-safe TTL map
//! - `CachedProvider` - `MarketDataProvider` decorator with per-kind TTLs

mod cached_provider;
mod ttl_cache;

pub use cached_provider::{CacheConfig, CachedProvider};
pub use ttl_cache::TtlCache;
