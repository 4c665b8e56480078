// ABOUTME: Domain models re-exported from tracker-core
// ABOUTME: Messages, trackers, and usage summaries used by services and routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use tracker_core::models::*;
