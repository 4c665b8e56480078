// ABOUTME: Chat message records stored in the append-only usage ledger
// ABOUTME: Defines MessageRole, the full Message record, and the message-log projection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Author of a logged chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Prompt typed by the user
    User,
    /// Reply produced by the assistant
    Assistant,
}

impl MessageRole {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(format!("unknown message role '{other}'")),
        }
    }
}

/// A persisted chat turn
///
/// `token_count` is computed once from `content` when the message is
/// appended and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message ID
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Owning tracker, not validated against the directory at write time
    pub tracker_id: String,
    /// Author of the turn
    pub role: MessageRole,
    /// Message text
    pub content: String,
    /// Tokens in `content` under the scheme active at write time
    pub token_count: u32,
    /// Server-side creation time
    pub timestamp: DateTime<Utc>,
}

/// Message-log row returned by tracker usage
///
/// `role` is the stored value as-is, so rows written by other writers with
/// an unexpected role still render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageLogEntry {
    /// Stored role value
    pub role: String,
    /// Message text
    pub content: String,
    /// Tokens recorded at write time
    pub token_count: u32,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_storage_form() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            assert_eq!(role.as_str().parse::<MessageRole>(), Ok(role));
        }
        assert!("system".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_message_serializes_camel_case() {
        let message = Message {
            id: "m1".to_owned(),
            user_id: "u1".to_owned(),
            tracker_id: "t1".to_owned(),
            role: MessageRole::Assistant,
            content: "Logged 12.50 for lunch".to_owned(),
            token_count: 7,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["trackerId"], "t1");
        assert_eq!(json["tokenCount"], 7);
        assert_eq!(json["role"], "assistant");
    }
}
