// ABOUTME: Main library entry point for the expense tracker usage accounting service
// ABOUTME: Token counting, message ledger, tracker directory, usage aggregation, and the usage API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Expense Tracker Usage Accounting
//!
//! Records the token cost of every chat message exchanged with the expense
//! assistant and reports it back per user, per tracker, and per day.
//!
//! ## Architecture
//!
//! - **Tokenizer**: fixed BPE (or estimate) scheme chosen at startup
//! - **Database**: append-only message ledger and the tracker directory (`SQLite`)
//! - **Services**: ledger writes, usage aggregation, best-effort chat logging
//! - **Routes**: `GET /api/usage` and `GET /api/usage/tracker/:tracker_id`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use expense_tracker::config::environment::ServerConfig;
//! use expense_tracker::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Usage API configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// Used by the binaries (src/bin/), integration tests (tests/) and benches.

/// JWT authentication and the per-request auth context
pub mod auth;

/// Environment-based configuration
pub mod config;

/// Ledger and tracker directory storage
pub mod database;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// HTTP middleware (request ids, tracing spans, CORS)
pub mod middleware;

/// Domain models
pub mod models;

/// Shared server resources
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// Usage domain services
pub mod services;

/// Token counting
pub mod tokenizer;

/// Shared constants
pub use tracker_core::constants;
