use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{ProductsRepo, RepoError};
use crate::domain::products::Product;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn create(&self, name: &str) -> Result<i64, RepoError> {
        let now = OffsetDateTime::now_utc();
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO products (name, created_at, updated_at) \
             VALUES ($1, $2, $2) RETURNING id",
        )
        .bind(name)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, RepoError> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, name, created_at, updated_at FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Product::from))
    }

    async fn update(&self, product: &Product) -> Result<(), RepoError> {
        let now = OffsetDateTime::now_utc();
        sqlx::query("UPDATE products SET name = $2, updated_at = $3 WHERE id = $1")
            .bind(product.id)
            .bind(&product.name)
            .bind(now)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
