//! Cache trait describing the key-value adapter.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::products::Product;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    Connection(String),
    #[error("malformed cached payload: {0}")]
    Payload(String),
}

impl CacheError {
    pub fn connection(err: impl std::fmt::Display) -> Self {
        Self::Connection(err.to_string())
    }

    pub fn payload(err: impl std::fmt::Display) -> Self {
        Self::Payload(err.to_string())
    }
}

/// Key-value cache over products, keyed by id. Advisory only: every failure
/// here is recoverable by falling through to the store, and the service
/// treats errors as misses.
#[async_trait]
pub trait ProductCache: Send + Sync {
    /// Look up the cached entry for an id. `Ok(None)` is a plain miss;
    /// `Err(Payload)` marks an entry that exists but cannot be decoded.
    async fn get(&self, id: i64) -> Result<Option<Product>, CacheError>;

    /// Store the full entity under its id with the given TTL. Concurrent
    /// writers may race; last write wins and all race to the same value.
    async fn put(&self, product: &Product, ttl: Duration) -> Result<(), CacheError>;

    /// Drop the entry for an id. Deleting an absent key is not an error.
    async fn invalidate(&self, id: i64) -> Result<(), CacheError>;
}

/// Cache key for a product id: the wire format is `product#<id>`.
pub fn product_key(id: i64) -> String {
    format!("product#{id}")
}
