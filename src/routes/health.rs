// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Provides liveness and database-backed readiness endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check routes for service monitoring
//!
//! Neither endpoint requires authentication.

use crate::resources::ServerResources;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::warn;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::health_handler))
            .route("/ready", get(Self::ready_handler))
            .with_state(resources)
    }

    async fn health_handler() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    /// Ready once the ledger store answers a trivial query
    async fn ready_handler(State(resources): State<Arc<ServerResources>>) -> Response {
        match sqlx::query("SELECT 1")
            .execute(resources.database.pool())
            .await
        {
            Ok(_) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "ready",
                    "timestamp": chrono::Utc::now().to_rfc3339()
                })),
            )
                .into_response(),
            Err(e) => {
                warn!("Readiness check failed: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(serde_json::json!({
                        "status": "unavailable",
                        "timestamp": chrono::Utc::now().to_rfc3339()
                    })),
                )
                    .into_response()
            }
        }
    }
}
