//! # API Endpoint Handlers
//!
//! One module per entity. Every handler returns `Result<Json<_>, ApiError>`
//! and performs at most one storage commit.

pub mod planets;
pub mod stations;
pub mod systems;

use super::types::HealthResponse;
use axum::{Json, response::IntoResponse};

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}
