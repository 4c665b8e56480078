// ABOUTME: Core data models for usage accounting
// ABOUTME: Re-exports Message, Tracker, and the derived usage summary types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `Message`: one logged chat turn (user prompt or assistant reply)
//! - `Tracker`: a user-owned ledger that messages are grouped under
//! - Usage summaries: derived, never persisted, recomputed on every read

mod message;
mod tracker;
mod usage;

pub use message::{Message, MessageLogEntry, MessageRole};
pub use tracker::{Tracker, TrackerId, TrackerType};
pub use usage::{DailyUsage, OverallUsage, TrackerUsage, TrackerUsageRow, UsageCounters};
