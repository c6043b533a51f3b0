//! Redis-backed product cache adapter.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use tracing::info;

use crate::application::cache::{CacheError, ProductCache, product_key};
use crate::config::CacheSettings;
use crate::domain::products::Product;
use crate::infra::error::InfraError;

#[derive(Clone)]
pub struct RedisProductCache {
    conn: ConnectionManager,
}

impl RedisProductCache {
    /// Open a multiplexed connection to the configured Redis instance. The
    /// manager reconnects on its own; per-request failures surface as
    /// [`CacheError::Connection`] and are handled by the caller.
    pub async fn connect(settings: &CacheSettings) -> Result<Self, InfraError> {
        let client = redis::Client::open(connection_info(settings))
            .map_err(|err| InfraError::cache(err.to_string()))?;

        let config = ConnectionManagerConfig::new()
            .set_connection_timeout(Duration::from_secs(settings.connect_timeout_seconds))
            .set_response_timeout(Duration::from_secs(settings.response_timeout_seconds));

        let conn = ConnectionManager::new_with_config(client, config)
            .await
            .map_err(|err| InfraError::cache(err.to_string()))?;

        info!("connected to redis");
        Ok(Self { conn })
    }
}

/// Structured connection parameters, sidestepping URL escaping: passwords
/// with reserved characters (`@`, `/`, `#`) pass through verbatim.
fn connection_info(settings: &CacheSettings) -> ConnectionInfo {
    ConnectionInfo {
        addr: ConnectionAddr::Tcp(settings.host.clone(), settings.port),
        redis: RedisConnectionInfo {
            db: i64::from(settings.db),
            password: settings
                .password
                .clone()
                .filter(|password| !password.is_empty()),
            ..Default::default()
        },
    }
}

#[async_trait]
impl ProductCache for RedisProductCache {
    async fn get(&self, id: i64) -> Result<Option<Product>, CacheError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn
            .get(product_key(id))
            .await
            .map_err(CacheError::connection)?;

        match payload {
            Some(json) => {
                let product = serde_json::from_str(&json).map_err(CacheError::payload)?;
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, product: &Product, ttl: Duration) -> Result<(), CacheError> {
        let json = serde_json::to_string(product).map_err(CacheError::payload)?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(product_key(product.id), json, ttl.as_secs())
            .await
            .map_err(CacheError::connection)?;
        Ok(())
    }

    async fn invalidate(&self, id: i64) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(product_key(id))
            .await
            .map_err(CacheError::connection)?;
        Ok(())
    }
}
