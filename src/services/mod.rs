// ABOUTME: Domain service layer for usage accounting
// ABOUTME: Ledger writes, usage aggregation, and best-effort chat turn logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Route handlers and the chat pipeline call into these services; storage is
//! reached only through the repository traits.

/// Append-only message ledger with token counting
pub mod ledger;

/// Overall and per-tracker usage summaries
pub mod usage;

/// Fire-and-forget logging of chat turns
pub mod usage_logger;

pub use ledger::MessageLedger;
pub use usage::UsageService;
pub use usage_logger::{ErrorReporter, TracingErrorReporter, TurnOutcome, UsageLogger};
