// ABOUTME: Derived usage summaries returned by the usage endpoints
// ABOUTME: Overall counters, per-tracker rows, per-day rows, and the tracker usage view
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{MessageLogEntry, TrackerType};
use serde::{Deserialize, Serialize};

/// Message and token counters over some set of messages
///
/// `user_messages + ai_messages <= total_messages`; messages with any other
/// role count toward the totals only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageCounters {
    /// Number of messages
    pub total_messages: u64,
    /// Sum of token counts
    pub total_tokens: u64,
    /// Messages with role `user`
    pub user_messages: u64,
    /// Messages with role `assistant`
    pub ai_messages: u64,
}

/// Usage for one tracker id seen in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerUsageRow {
    /// Tracker ID as stored on the messages
    pub tracker_id: String,
    /// Resolved name, or `Unknown`
    pub tracker_name: String,
    /// Resolved type, or `personal`
    pub tracker_type: TrackerType,
    /// Number of messages
    pub message_count: u64,
    /// Sum of token counts
    pub token_count: u64,
    /// Messages with role `user`
    pub user_messages: u64,
    /// Messages with role `assistant`
    pub ai_messages: u64,
}

/// Usage for one UTC calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsage {
    /// Day as `YYYY-MM-DD`
    pub date: String,
    /// Number of messages
    pub message_count: u64,
    /// Sum of token counts
    pub token_count: u64,
}

/// Response of the overall usage endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallUsage {
    /// Counters across every message of the user
    pub overall: UsageCounters,
    /// One row per tracker, most messages first
    pub by_tracker: Vec<TrackerUsageRow>,
    /// Trailing-window activity, oldest day first
    pub recent_activity: Vec<DailyUsage>,
}

/// Response of the single-tracker usage endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerUsage {
    /// Tracker ID
    pub tracker_id: String,
    /// Tracker name
    pub tracker_name: String,
    /// Tracker type
    pub tracker_type: TrackerType,
    /// Counters across the tracker's messages
    #[serde(flatten)]
    pub counters: UsageCounters,
    /// Trailing-window activity, newest day first
    pub daily_usage: Vec<DailyUsage>,
    /// Most recent messages, newest first
    pub messages: Vec<MessageLogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_usage_flattens_counters() {
        let usage = TrackerUsage {
            tracker_id: "t1".to_owned(),
            tracker_name: "Groceries".to_owned(),
            tracker_type: TrackerType::Personal,
            counters: UsageCounters {
                total_messages: 6,
                total_tokens: 75,
                user_messages: 3,
                ai_messages: 3,
            },
            daily_usage: Vec::new(),
            messages: Vec::new(),
        };

        let json = serde_json::to_value(&usage).unwrap();
        assert_eq!(json["totalMessages"], 6);
        assert_eq!(json["totalTokens"], 75);
        assert_eq!(json["trackerType"], "personal");
        assert!(json["dailyUsage"].as_array().unwrap().is_empty());
        assert!(json.get("counters").is_none());
    }
}
