// ABOUTME: Shared constants for usage accounting windows, limits, and fallbacks
// ABOUTME: Used by the aggregator, configuration defaults, and request validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Usage reporting defaults
pub mod usage {
    /// Trailing window, in days, for per-day activity rows
    pub const DEFAULT_WINDOW_DAYS: u32 = 30;

    /// Maximum number of messages returned in a tracker message log
    pub const DEFAULT_RECENT_MESSAGE_LIMIT: u32 = 100;

    /// Day-key format used when grouping messages by calendar day (UTC)
    pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";
}

/// Fallback metadata for messages whose tracker is no longer in the directory
pub mod tracker_fallback {
    /// Name reported for a tracker that cannot be resolved
    pub const UNKNOWN_NAME: &str = "Unknown";
}

/// Tracker identifier validation
pub mod tracker_id {
    /// Literal values sent by broken clients in place of a real identifier
    pub const SENTINEL_VALUES: [&str; 2] = ["undefined", "null"];

    /// Longest accepted tracker identifier
    pub const MAX_LENGTH: usize = 64;
}

/// Service identification for logs
pub mod service_names {
    /// Service name used in structured logs
    pub const EXPENSE_TRACKER: &str = "expense-tracker";
}
