// ABOUTME: Route module organization for the usage accounting HTTP endpoints
// ABOUTME: Groups route definitions by domain with thin handlers over the service layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the service layer.

/// Health check and readiness routes
pub mod health;
/// Overall and per-tracker usage routes
pub mod usage;

pub use health::HealthRoutes;
pub use usage::UsageRoutes;
