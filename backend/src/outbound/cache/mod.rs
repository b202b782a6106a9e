//! User cache adapters.
//!
//! The Redis adapter pools connections with `bb8-redis`, stores users as JSON
//! under namespaced keys (`user:v1:<uuid>`) and applies a TTL on every write
//! so stale entries age out even if an invalidation is lost.

mod redis_user_cache;

pub use redis_user_cache::{RedisUserCache, RedisUserCacheSettings};
