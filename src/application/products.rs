//! Product service: the cache-aside read path with invalidation on write.
//!
//! Reads populate the cache lazily on a store hit; mutations delete the
//! cache entry instead of rewriting it. The cache therefore never holds a
//! value the store has not committed, and staleness is bounded by the TTL
//! plus invalidation on every mutation for that id.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, error, info, warn};

use crate::application::cache::ProductCache;
use crate::application::error::ServiceError;
use crate::application::repos::ProductsRepo;
use crate::domain::products::{Product, ProductInfo};

/// TTL applied to every cache entry written by the read path.
pub const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

pub const METRIC_CACHE_HIT_TOTAL: &str = "merx_cache_hit_total";
pub const METRIC_CACHE_MISS_TOTAL: &str = "merx_cache_miss_total";
pub const METRIC_CACHE_INVALIDATE_TOTAL: &str = "merx_cache_invalidate_total";
pub const METRIC_CACHE_ERROR_TOTAL: &str = "merx_cache_error_total";

#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductsRepo>,
    cache: Arc<dyn ProductCache>,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductsRepo>, cache: Arc<dyn ProductCache>) -> Self {
        Self { repo, cache }
    }

    /// Insert a new product and return its store-assigned id. The cache is
    /// not touched: the first read misses and populates it.
    pub async fn create(&self, name: &str) -> Result<i64, ServiceError> {
        let id = self.repo.create(name).await.map_err(|err| {
            error!(error = %err, "failed to create product");
            ServiceError::from(err)
        })?;
        info!(id, "product created");
        Ok(id)
    }

    /// Resolve a product, preferring the cache. A well-formed cached entry
    /// is trusted as-is; misses, connection errors, and malformed payloads
    /// all fall through to the store, which then repopulates the cache.
    pub async fn find_by_id(&self, id: i64) -> Result<ProductInfo, ServiceError> {
        match self.cache.get(id).await {
            Ok(Some(product)) => {
                counter!(METRIC_CACHE_HIT_TOTAL).increment(1);
                debug!(id, "product served from cache");
                return Ok(ProductInfo::from(&product));
            }
            Ok(None) => {
                counter!(METRIC_CACHE_MISS_TOTAL).increment(1);
                debug!(id, "product cache miss");
            }
            Err(err) => {
                counter!(METRIC_CACHE_ERROR_TOTAL).increment(1);
                warn!(id, error = %err, "product cache read failed, treating as miss");
            }
        }

        let product = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|err| {
                error!(id, error = %err, "failed to find product");
                ServiceError::from(err)
            })?
            .ok_or_else(|| ServiceError::not_found("Product not found"))?;

        let info = ProductInfo::from(&product);
        self.save_cache(&product).await;
        Ok(info)
    }

    /// Rename a product. Existence is confirmed against the store, never the
    /// cache; on success the cache entry is invalidated, not repopulated.
    pub async fn update(&self, id: i64, name: &str) -> Result<(), ServiceError> {
        let mut product = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|err| {
                error!(id, error = %err, "failed to find product for update");
                ServiceError::from(err)
            })?
            .ok_or_else(|| ServiceError::not_found("Product not found"))?;

        product.name = name.to_string();

        self.repo.update(&product).await.map_err(|err| {
            error!(id, error = %err, "failed to update product");
            ServiceError::from(err)
        })?;

        self.invalidate_cache(id).await;
        info!(id, "product updated");
        Ok(())
    }

    /// Delete a product. The store reports absence through the affected row
    /// count; the cache entry is invalidated afterwards.
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let rows_affected = self.repo.delete(id).await.map_err(|err| {
            error!(id, error = %err, "failed to delete product");
            ServiceError::from(err)
        })?;

        if rows_affected == 0 {
            return Err(ServiceError::not_found("Product not found"));
        }

        self.invalidate_cache(id).await;
        info!(id, "product deleted");
        Ok(())
    }

    async fn save_cache(&self, product: &Product) {
        if let Err(err) = self.cache.put(product, PRODUCT_CACHE_TTL).await {
            counter!(METRIC_CACHE_ERROR_TOTAL).increment(1);
            warn!(id = product.id, error = %err, "failed to save product cache");
        } else {
            debug!(id = product.id, "product cache saved");
        }
    }

    async fn invalidate_cache(&self, id: i64) {
        match self.cache.invalidate(id).await {
            Ok(()) => {
                counter!(METRIC_CACHE_INVALIDATE_TOTAL).increment(1);
            }
            Err(err) => {
                counter!(METRIC_CACHE_ERROR_TOTAL).increment(1);
                warn!(id, error = %err, "failed to invalidate product cache");
            }
        }
    }
}
