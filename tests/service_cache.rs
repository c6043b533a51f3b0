//! Cache-aside protocol tests over in-memory fakes.
//!
//! The fakes count store reads and record cache traffic so each test can
//! assert which side actually served a request.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use merx::application::cache::{CacheError, ProductCache};
use merx::application::error::ErrorKind;
use merx::application::products::{PRODUCT_CACHE_TTL, ProductService};
use merx::application::repos::{ProductsRepo, RepoError};
use merx::domain::products::Product;

#[derive(Default)]
struct MemoryRepo {
    rows: Mutex<HashMap<i64, Product>>,
    next_id: AtomicU64,
    find_calls: AtomicU64,
}

impl MemoryRepo {
    fn find_count(&self) -> u64 {
        self.find_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ProductsRepo for MemoryRepo {
    async fn create(&self, name: &str) -> Result<i64, RepoError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) as i64 + 1;
        let now = OffsetDateTime::now_utc();
        let product = Product {
            id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().await.insert(id, product);
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, RepoError> {
        self.find_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn update(&self, product: &Product) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().await;
        if let Some(existing) = rows.get_mut(&product.id) {
            existing.name = product.name.clone();
            existing.updated_at = OffsetDateTime::now_utc();
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<u64, RepoError> {
        Ok(self.rows.lock().await.remove(&id).map_or(0, |_| 1))
    }
}

#[derive(Default)]
struct MemoryCache {
    entries: Mutex<HashMap<i64, Product>>,
    put_calls: AtomicU64,
    invalidate_calls: AtomicU64,
}

impl MemoryCache {
    async fn contains(&self, id: i64) -> bool {
        self.entries.lock().await.contains_key(&id)
    }

    async fn seed(&self, product: Product) {
        self.entries.lock().await.insert(product.id, product);
    }

    fn put_count(&self) -> u64 {
        self.put_calls.load(Ordering::Relaxed)
    }

    fn invalidate_count(&self) -> u64 {
        self.invalidate_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ProductCache for MemoryCache {
    async fn get(&self, id: i64) -> Result<Option<Product>, CacheError> {
        Ok(self.entries.lock().await.get(&id).cloned())
    }

    async fn put(&self, product: &Product, _ttl: Duration) -> Result<(), CacheError> {
        self.put_calls.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .await
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn invalidate(&self, id: i64) -> Result<(), CacheError> {
        self.invalidate_calls.fetch_add(1, Ordering::Relaxed);
        self.entries.lock().await.remove(&id);
        Ok(())
    }
}

/// Cache whose every operation fails, as if Redis were unreachable.
struct UnreachableCache;

#[async_trait]
impl ProductCache for UnreachableCache {
    async fn get(&self, _id: i64) -> Result<Option<Product>, CacheError> {
        Err(CacheError::connection("connection refused"))
    }

    async fn put(&self, _product: &Product, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::connection("connection refused"))
    }

    async fn invalidate(&self, _id: i64) -> Result<(), CacheError> {
        Err(CacheError::connection("connection refused"))
    }
}

/// Cache that holds an entry it can no longer decode.
struct MalformedCache;

#[async_trait]
impl ProductCache for MalformedCache {
    async fn get(&self, _id: i64) -> Result<Option<Product>, CacheError> {
        Err(CacheError::payload("expected value at line 1 column 1"))
    }

    async fn put(&self, _product: &Product, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn invalidate(&self, _id: i64) -> Result<(), CacheError> {
        Ok(())
    }
}

fn service_with(repo: Arc<MemoryRepo>, cache: Arc<MemoryCache>) -> ProductService {
    ProductService::new(repo, cache)
}

#[tokio::test]
async fn create_does_not_touch_the_cache() {
    let repo = Arc::new(MemoryRepo::default());
    let cache = Arc::new(MemoryCache::default());
    let service = service_with(repo, cache.clone());

    let id = service.create("Widget").await.expect("create");
    assert!(!cache.contains(id).await);
    assert_eq!(cache.put_count(), 0);
}

#[tokio::test]
async fn first_read_hits_store_and_populates_cache() {
    let repo = Arc::new(MemoryRepo::default());
    let cache = Arc::new(MemoryCache::default());
    let service = service_with(repo.clone(), cache.clone());

    let id = service.create("Widget").await.expect("create");

    let info = service.find_by_id(id).await.expect("first read");
    assert_eq!(info.name, "Widget");
    assert_eq!(repo.find_count(), 1);
    assert!(cache.contains(id).await);
}

#[tokio::test]
async fn second_read_is_served_from_cache() {
    let repo = Arc::new(MemoryRepo::default());
    let cache = Arc::new(MemoryCache::default());
    let service = service_with(repo.clone(), cache.clone());

    let id = service.create("Widget").await.expect("create");

    let first = service.find_by_id(id).await.expect("first read");
    let second = service.find_by_id(id).await.expect("second read");

    assert_eq!(first, second);
    // The second read must not touch the store.
    assert_eq!(repo.find_count(), 1);
}

#[tokio::test]
async fn cached_entry_is_trusted_over_the_store() {
    let repo = Arc::new(MemoryRepo::default());
    let cache = Arc::new(MemoryCache::default());
    let service = service_with(repo.clone(), cache.clone());

    // Seed a cache entry for an id the store has never seen.
    let now = OffsetDateTime::now_utc();
    cache
        .seed(Product {
            id: 99,
            name: "Phantom".to_string(),
            created_at: now,
            updated_at: now,
        })
        .await;

    let info = service.find_by_id(99).await.expect("cached read");
    assert_eq!(info.name, "Phantom");
    assert_eq!(repo.find_count(), 0);
}

#[tokio::test]
async fn update_invalidates_instead_of_repopulating() {
    let repo = Arc::new(MemoryRepo::default());
    let cache = Arc::new(MemoryCache::default());
    let service = service_with(repo.clone(), cache.clone());

    let id = service.create("Widget").await.expect("create");
    service.find_by_id(id).await.expect("warm cache");
    assert!(cache.contains(id).await);

    service.update(id, "Gadget").await.expect("update");
    assert!(!cache.contains(id).await);
    assert_eq!(cache.invalidate_count(), 1);

    // The next read must re-fetch and see the new name, never the stale one.
    let info = service.find_by_id(id).await.expect("read after update");
    assert_eq!(info.name, "Gadget");
}

#[tokio::test]
async fn delete_invalidates_cache_entry() {
    let repo = Arc::new(MemoryRepo::default());
    let cache = Arc::new(MemoryCache::default());
    let service = service_with(repo.clone(), cache.clone());

    let id = service.create("Widget").await.expect("create");
    service.find_by_id(id).await.expect("warm cache");

    service.delete(id).await.expect("delete");
    assert!(!cache.contains(id).await);

    let err = service.find_by_id(id).await.expect_err("read after delete");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn deleting_a_nonexistent_id_is_not_found() {
    let repo = Arc::new(MemoryRepo::default());
    let cache = Arc::new(MemoryCache::default());
    let service = service_with(repo, cache.clone());

    let err = service.delete(999_999).await.expect_err("delete absent");
    assert_eq!(err.kind, ErrorKind::NotFound);
    // Nothing existed, so nothing was invalidated.
    assert_eq!(cache.invalidate_count(), 0);
}

#[tokio::test]
async fn updating_a_nonexistent_id_is_not_found() {
    let repo = Arc::new(MemoryRepo::default());
    let cache = Arc::new(MemoryCache::default());
    let service = service_with(repo, cache);

    let err = service.update(999_999, "Gadget").await.expect_err("update absent");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn unreachable_cache_is_never_fatal() {
    let repo = Arc::new(MemoryRepo::default());
    let service = ProductService::new(repo.clone(), Arc::new(UnreachableCache));

    let id = service.create("Widget").await.expect("create");
    let info = service.find_by_id(id).await.expect("read despite cache outage");
    assert_eq!(info.name, "Widget");

    service.update(id, "Gadget").await.expect("update despite cache outage");
    service.delete(id).await.expect("delete despite cache outage");
}

#[tokio::test]
async fn malformed_cached_payload_falls_through_to_store() {
    let repo = Arc::new(MemoryRepo::default());
    let service = ProductService::new(repo.clone(), Arc::new(MalformedCache));

    let id = service.create("Widget").await.expect("create");
    let info = service.find_by_id(id).await.expect("read past bad payload");
    assert_eq!(info.name, "Widget");
    assert_eq!(repo.find_count(), 1);
}

#[tokio::test]
async fn end_to_end_scenario() {
    let repo = Arc::new(MemoryRepo::default());
    let cache = Arc::new(MemoryCache::default());
    let service = service_with(repo, cache);

    let id = service.create("Widget").await.expect("create");
    assert_eq!(id, 1);

    let info = service.find_by_id(id).await.expect("get");
    assert_eq!((info.id, info.name.as_str()), (1, "Widget"));

    service.update(id, "Gadget").await.expect("update");
    let info = service.find_by_id(id).await.expect("get after update");
    assert_eq!(info.name, "Gadget");

    service.delete(id).await.expect("delete");
    let err = service.find_by_id(id).await.expect_err("get after delete");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[test]
fn cache_ttl_is_thirty_minutes() {
    assert_eq!(PRODUCT_CACHE_TTL, Duration::from_secs(30 * 60));
}
