//! gRPC surface for product reads.
//!
//! The generated code under [`pb`] is committed (see `proto/product/v1/
//! product.proto`) so builds do not require `protoc`; regenerate with
//! `tonic-build` when the proto changes.

pub mod pb;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tonic::{Request, Response, Status, transport::Server};
use tracing::info;

use crate::application::error::{ErrorKind, ServiceError};
use crate::application::products::ProductService;

use pb::product_service_server::{ProductService as ProductRpc, ProductServiceServer};
use pb::{GetProductRequest, GetProductResponse};

/// Map a service error onto the gRPC status space by direct kind inspection.
fn status_from(err: ServiceError) -> Status {
    match err.kind {
        ErrorKind::BadRequest => Status::invalid_argument(err.message),
        ErrorKind::NotFound => Status::not_found(err.message),
        ErrorKind::Internal => Status::internal("internal server error"),
    }
}

pub struct ProductGrpcService {
    products: Arc<ProductService>,
}

impl ProductGrpcService {
    pub fn new(products: Arc<ProductService>) -> Self {
        Self { products }
    }
}

#[tonic::async_trait]
impl ProductRpc for ProductGrpcService {
    async fn get_product(
        &self,
        request: Request<GetProductRequest>,
    ) -> Result<Response<GetProductResponse>, Status> {
        let id = request.into_inner().id;
        if id <= 0 {
            return Err(Status::invalid_argument("product id must be positive"));
        }

        let info = self.products.find_by_id(id).await.map_err(status_from)?;
        Ok(Response::new(GetProductResponse {
            id: info.id,
            name: info.name,
        }))
    }
}

/// Serve the gRPC listener until the shutdown future resolves.
pub async fn serve(
    addr: SocketAddr,
    products: Arc<ProductService>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), tonic::transport::Error> {
    info!(%addr, "gRPC server listening");
    Server::builder()
        .add_service(ProductServiceServer::new(ProductGrpcService::new(products)))
        .serve_with_shutdown(addr, shutdown)
        .await
}
