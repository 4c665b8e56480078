// ABOUTME: Tracker directory records and validated tracker identifiers
// ABOUTME: Defines TrackerType, Tracker, and the TrackerId newtype with request validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::tracker_id::{MAX_LENGTH, SENTINEL_VALUES};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of ledger a tracker represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerType {
    /// Personal expenses; also the fallback for unresolved trackers
    #[default]
    Personal,
    /// Business expenses
    Business,
}

impl TrackerType {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Business => "business",
        }
    }

    /// Parse the stored value, falling back to `Personal` for anything unknown
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "business" => Self::Business,
            _ => Self::Personal,
        }
    }
}

impl fmt::Display for TrackerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracker as owned by the tracker CRUD layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracker {
    /// Tracker ID
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Personal or business
    #[serde(rename = "type")]
    pub tracker_type: TrackerType,
    /// When the tracker was created
    pub created_at: DateTime<Utc>,
}

/// Tracker identifier that passed request validation
///
/// Rejects empty values, the `undefined`/`null` literals that broken clients
/// send, overlong values, and anything outside `[A-Za-z0-9_-]`. Surrounding
/// whitespace is an error, never trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackerId(String);

impl TrackerId {
    /// Validate a raw path parameter
    ///
    /// # Errors
    ///
    /// Returns an `INVALID_INPUT` error when the identifier is malformed
    pub fn parse(raw: &str) -> AppResult<Self> {
        let is_sentinel = SENTINEL_VALUES
            .iter()
            .any(|sentinel| raw.trim().eq_ignore_ascii_case(sentinel));

        // Padding is rejected by the charset rule rather than trimmed away
        let well_formed = !raw.is_empty()
            && raw.len() <= MAX_LENGTH
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

        if is_sentinel || !well_formed {
            return Err(AppError::invalid_input("Invalid tracker ID"));
        }

        Ok(Self(raw.to_owned()))
    }

    /// Borrow the identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the identifier
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrackerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_accepts_uuid_and_object_id_shapes() {
        assert!(TrackerId::parse("6f1c2b9e-8d3a-4e7b-9c1d-2a3b4c5d6e7f").is_ok());
        assert!(TrackerId::parse("65a1f0c2e4b0a1b2c3d4e5f6").is_ok());
        assert_eq!(TrackerId::parse("abc_1").unwrap().as_str(), "abc_1");
    }

    #[test]
    fn test_rejects_padded_identifiers() {
        for raw in [" abc ", "abc\n", "\tabc", "abc "] {
            let error = TrackerId::parse(raw).unwrap_err();
            assert_eq!(error.code, ErrorCode::InvalidInput, "{raw:?}");
        }
    }

    #[test]
    fn test_rejects_sentinels() {
        for raw in ["undefined", "null", "NULL", " Undefined "] {
            let error = TrackerId::parse(raw).unwrap_err();
            assert_eq!(error.code, ErrorCode::InvalidInput);
        }
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(TrackerId::parse("").is_err());
        assert!(TrackerId::parse("   ").is_err());
        assert!(TrackerId::parse("a/b").is_err());
        assert!(TrackerId::parse("x'; DROP TABLE trackers;--").is_err());
        assert!(TrackerId::parse(&"a".repeat(MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_unknown_tracker_type_defaults_to_personal() {
        assert_eq!(TrackerType::from_str_or_default("business"), TrackerType::Business);
        assert_eq!(TrackerType::from_str_or_default("family"), TrackerType::Personal);
        assert_eq!(TrackerType::default(), TrackerType::Personal);
    }
}
