//! Caching layer for link lookups and rate-limit counters.
//!
//! [`CacheService`] has three implementations:
//! - [`RedisCache`] - production Redis-backed cache
//! - [`MemoryCache`] - process-local cache used without Redis and in tests
//! - [`NullCache`] - no-op fallback when Redis is unreachable at startup

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService, link_key};

#[cfg(test)]
pub use service::MockCacheService;
