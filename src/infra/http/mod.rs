//! REST surface: router, handlers, and response envelope.

pub mod error;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::application::products::ProductService;
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<ProductService>,
    pub db: Arc<PostgresRepositories>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/products", post(handlers::create_product))
        .route(
            "/api/v1/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .with_state(state)
}
