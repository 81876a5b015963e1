use crate::api::error::ErrorBody;
use axum::{
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Маршрут не найден";

// fallback for every unmatched route
pub async fn not_found(method: Method, uri: Uri) -> Response {
    debug!(method = %method, path = uri.path(), "No route matched");

    not_found_response()
}

#[must_use]
pub fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new(ROUTE_NOT_FOUND_MESSAGE)),
    )
        .into_response()
}
