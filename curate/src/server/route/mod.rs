use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

/// Fixed liveness answer for the load balancer
pub async fn handler_health() -> impl IntoResponse {
    (StatusCode::OK, "healthy")
}

/// Fallback for every route other than the health check
pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "The requested resource was not found")
}

pub(crate) fn server_router() -> Router {
    Router::new().route("/health", get(handler_health)).fallback(handler_404)
}
