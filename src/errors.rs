// ABOUTME: Unified error handling re-exported from tracker-core
// ABOUTME: Single import point for AppError, ErrorCode, and AppResult across the service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use tracker_core::errors::*;
