// ABOUTME: Core types and constants for the expense tracker usage service
// ABOUTME: Foundation crate with error handling, domain models, and usage constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Tracker Core
//!
//! Foundation crate providing shared types for the expense tracker usage
//! accounting service. It changes rarely, so the service crate benefits from
//! incremental compilation.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `DatabaseError`
//! - **models**: Messages, trackers, and the derived usage summaries
//! - **constants**: Usage window, message-log cap, and tracker fallbacks

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Core data models (Message, Tracker, usage summaries)
pub mod models;

/// Application constants for usage accounting
pub mod constants;
