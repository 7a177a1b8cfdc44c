//! Caching of decoded bin file payloads.

mod payload_cache;

pub use payload_cache::{CacheKey, PayloadCache, PayloadQuery};
