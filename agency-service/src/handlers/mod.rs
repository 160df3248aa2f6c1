//! HTTP handlers, one module per resource. Every business endpoint is
//! tenant-scoped through [`crate::middleware::TenantContext`].

pub mod bills;
pub mod bookings;
pub mod reports;
pub mod roster;

use crate::services::metrics::get_metrics;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "agency-service" })),
    )
}

pub async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

pub async fn metrics() -> impl IntoResponse {
    (StatusCode::OK, get_metrics())
}
