//! Local cache for project reference data and user info.
//!
//! This module provides a file-backed cache that:
//! - Stores one JSON document per project ID plus a singleton user-info slot
//! - Timestamps every entry and ignores entries older than one hour
//! - Treats missing, corrupt and expired files alike as a cache miss

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
#[cfg(test)]
pub use storage::FileStorage;
