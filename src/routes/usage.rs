// ABOUTME: Usage route handlers for overall and per-tracker token accounting
// ABOUTME: Authenticates the caller and delegates to the usage aggregation service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Usage routes
//!
//! | Route | Errors |
//! |---|---|
//! | `GET /api/usage` | 401, 500 |
//! | `GET /api/usage/tracker/:tracker_id` | 400, 401, 404, 500 |

use crate::auth::AuthContext;
use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::Span;

/// Usage routes
pub struct UsageRoutes;

impl UsageRoutes {
    /// Create all usage routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/usage", get(Self::handle_overall_usage))
            .route(
                "/api/usage/tracker/:tracker_id",
                get(Self::handle_tracker_usage),
            )
            .with_state(resources)
    }

    fn authenticate(
        headers: &HeaderMap,
        resources: &ServerResources,
    ) -> Result<AuthContext, AppError> {
        let auth = resources.auth_manager.authenticate(headers)?;
        Span::current().record("user_id", auth.user_id.as_str());
        Ok(auth)
    }

    /// Overall usage across all of the caller's trackers
    async fn handle_overall_usage(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let usage = resources.usage_service.overall_usage(&auth).await?;
        Ok((StatusCode::OK, Json(usage)).into_response())
    }

    /// Usage for one tracker the caller owns
    async fn handle_tracker_usage(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(tracker_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources)?;
        let usage = resources
            .usage_service
            .tracker_usage(&auth, &tracker_id)
            .await?;
        Ok((StatusCode::OK, Json(usage)).into_response())
    }
}
