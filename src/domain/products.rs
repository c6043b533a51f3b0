//! Product entity and its read projection.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::error::DomainError;

/// Minimum accepted length for a product name, in characters.
pub const MIN_NAME_LEN: usize = 3;

/// Persistent product record. `id` is store-assigned and immutable;
/// timestamps are set server-side and never accepted from callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Caller-facing projection of a product. Also the shape read back out of
/// the cache, which stores the full [`Product`] payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: i64,
    pub name: String,
}

impl From<&Product> for ProductInfo {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
        }
    }
}

/// Validate a product name against the domain rules. Counted in characters,
/// not bytes, so multi-byte names are not penalized.
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::validation("name must not be empty"));
    }
    if name.chars().count() < MIN_NAME_LEN {
        return Err(DomainError::validation(format!(
            "name must be at least {MIN_NAME_LEN} characters"
        )));
    }
    Ok(())
}
