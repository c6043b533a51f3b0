//! Product REST handlers.
//!
//! Input validation happens here, at the boundary: malformed bodies,
//! non-numeric ids, and too-short names are rejected before the service
//! is invoked.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::application::error::ServiceError;
use crate::domain::products::validate_name;

use super::AppState;
use super::error::ApiError;
use super::models::{BaseResponse, CreatedData, ProductCreateRequest, ProductUpdateRequest};

pub async fn health(State(state): State<AppState>) -> Response {
    match state.db.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            warn!(error = %err, "database health check failed");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(reject_body)?;
    validate_name(&request.name).map_err(ServiceError::from)?;

    let id = state.products.create(&request.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(BaseResponse::success(CreatedData { id })),
    ))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let info = state.products.find_by_id(id).await?;
    Ok(Json(BaseResponse::success(info)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProductUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let Json(request) = payload.map_err(reject_body)?;
    validate_name(&request.name).map_err(ServiceError::from)?;

    state.products.update(id, &request.name).await?;
    Ok(Json(BaseResponse::success_empty()))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    state.products.delete(id).await?;
    Ok(Json(BaseResponse::success_empty()))
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|err| {
        warn!(id = raw, error = %err, "invalid product id");
        ApiError::bad_request("Invalid product id")
    })
}

fn reject_body(rejection: JsonRejection) -> ApiError {
    warn!(error = %rejection, "invalid request body");
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return ApiError::bad_request("Request body must be `application/json`");
    }
    let text = rejection.body_text();
    // An absent body surfaces as a syntax error at EOF.
    if text.contains("EOF while parsing") {
        return ApiError::bad_request("Request body empty");
    }
    ApiError::bad_request(text)
}
