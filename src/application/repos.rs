//! Repository trait describing the persistence adapter.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::products::Product;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Persistence operations over the products table. The store is the single
/// source of truth; implementations own row-to-entity mapping.
#[async_trait]
pub trait ProductsRepo: Send + Sync {
    /// Insert a new product with server-assigned timestamps, returning its id.
    async fn create(&self, name: &str) -> Result<i64, RepoError>;

    /// Fetch one product by id. Absence is `Ok(None)`, not an error; the
    /// service owns not-found classification.
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, RepoError>;

    /// Persist a changed name and `updated_at` for an existing record.
    async fn update(&self, product: &Product) -> Result<(), RepoError>;

    /// Delete by id, returning the number of rows affected.
    async fn delete(&self, id: i64) -> Result<u64, RepoError>;
}
