// ABOUTME: Usage aggregation service composing ledger aggregates with tracker lookups
// ABOUTME: Builds the overall and single-tracker usage views and forwards message logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Usage Aggregator
//!
//! Summaries are recomputed from the ledger on every read. The aggregate
//! calls behind one view are independent reads, not a snapshot.
//!
//! Per-day rows sort ascending in the overall view and descending in the
//! tracker view. Clients depend on both orders.

use super::MessageLedger;
use crate::auth::AuthContext;
use crate::config::UsageConfig;
use crate::database::repositories::TrackerRepository;
use crate::database::{AggregateRow, DatabaseError, GroupKey, MessageFilter, MessageQuery, SortOrder};
use crate::errors::{AppError, AppResult};
use crate::models::{
    DailyUsage, Message, MessageRole, OverallUsage, Tracker, TrackerId, TrackerType, TrackerUsage,
    TrackerUsageRow, UsageCounters,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument};
use tracker_core::constants::tracker_fallback::UNKNOWN_NAME;
use tracker_core::constants::usage::DAY_KEY_FORMAT;

/// Aggregate row after its counters passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
struct CheckedAggregate {
    key: Option<String>,
    counters: UsageCounters,
}

impl TryFrom<AggregateRow> for CheckedAggregate {
    type Error = DatabaseError;

    fn try_from(row: AggregateRow) -> Result<Self, Self::Error> {
        let counters = UsageCounters {
            total_messages: non_negative("message_count", row.message_count)?,
            total_tokens: non_negative("token_count", row.token_count)?,
            user_messages: non_negative("user_messages", row.user_messages)?,
            ai_messages: non_negative("ai_messages", row.ai_messages)?,
        };

        if counters.user_messages + counters.ai_messages > counters.total_messages {
            return Err(DatabaseError::InvalidData {
                field: "message_count",
                reason: format!(
                    "role buckets ({} + {}) exceed total {}",
                    counters.user_messages, counters.ai_messages, counters.total_messages
                ),
            });
        }

        Ok(Self {
            key: row.key,
            counters,
        })
    }
}

impl CheckedAggregate {
    fn required_key(self, field: &'static str) -> Result<(String, UsageCounters), DatabaseError> {
        match self.key {
            Some(key) => Ok((key, self.counters)),
            None => Err(DatabaseError::InvalidData {
                field,
                reason: "grouped row has no key".to_owned(),
            }),
        }
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u64, DatabaseError> {
    u64::try_from(value).map_err(|_| DatabaseError::InvalidData {
        field,
        reason: format!("negative aggregate {value}"),
    })
}

fn check_rows(rows: Vec<AggregateRow>) -> Result<Vec<CheckedAggregate>, DatabaseError> {
    rows.into_iter().map(CheckedAggregate::try_from).collect()
}

/// Counters of an ungrouped aggregate; no rows means no messages
fn overall_counters(rows: Vec<AggregateRow>) -> Result<UsageCounters, DatabaseError> {
    let mut checked = check_rows(rows)?;
    match checked.len() {
        0 => Ok(UsageCounters::default()),
        1 => Ok(checked.swap_remove(0).counters),
        n => Err(DatabaseError::InvalidData {
            field: "group_key",
            reason: format!("ungrouped aggregate returned {n} rows"),
        }),
    }
}

fn daily_rows(rows: Vec<AggregateRow>) -> Result<Vec<DailyUsage>, DatabaseError> {
    check_rows(rows)?
        .into_iter()
        .map(|row| {
            let (date, counters) = row.required_key("date")?;
            NaiveDate::parse_from_str(&date, DAY_KEY_FORMAT).map_err(|e| {
                DatabaseError::InvalidData {
                    field: "date",
                    reason: format!("'{date}' is not a calendar day: {e}"),
                }
            })?;
            Ok(DailyUsage {
                date,
                message_count: counters.total_messages,
                token_count: counters.total_tokens,
            })
        })
        .collect()
}

fn tracker_rows(
    rows: Vec<CheckedAggregate>,
    directory: &HashMap<String, Tracker>,
) -> Result<Vec<TrackerUsageRow>, DatabaseError> {
    rows.into_iter()
        .map(|row| {
            let (tracker_id, counters) = row.required_key("tracker_id")?;
            let (tracker_name, tracker_type) = directory.get(&tracker_id).map_or_else(
                || (UNKNOWN_NAME.to_owned(), TrackerType::Personal),
                |tracker| (tracker.name.clone(), tracker.tracker_type),
            );
            Ok(TrackerUsageRow {
                tracker_id,
                tracker_name,
                tracker_type,
                message_count: counters.total_messages,
                token_count: counters.total_tokens,
                user_messages: counters.user_messages,
                ai_messages: counters.ai_messages,
            })
        })
        .collect()
}

/// Usage accounting service
#[derive(Clone)]
pub struct UsageService {
    ledger: MessageLedger,
    trackers: Arc<dyn TrackerRepository>,
    config: UsageConfig,
}

impl UsageService {
    /// Create a usage service
    #[must_use]
    pub fn new(
        ledger: MessageLedger,
        trackers: Arc<dyn TrackerRepository>,
        config: UsageConfig,
    ) -> Self {
        Self {
            ledger,
            trackers,
            config,
        }
    }

    /// The underlying ledger
    #[must_use]
    pub const fn ledger(&self) -> &MessageLedger {
        &self.ledger
    }

    /// The tracker directory
    #[must_use]
    pub fn trackers(&self) -> &Arc<dyn TrackerRepository> {
        &self.trackers
    }

    fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.config.window_days))
    }

    /// Overall usage for the caller
    ///
    /// # Errors
    ///
    /// Returns a `DATABASE_ERROR` if any aggregation or lookup fails
    pub async fn overall_usage(&self, auth: &AuthContext) -> AppResult<OverallUsage> {
        self.overall_usage_at(auth, Utc::now()).await
    }

    /// Overall usage with the trailing window anchored at `now`
    ///
    /// # Errors
    ///
    /// Returns a `DATABASE_ERROR` if any aggregation or lookup fails
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id))]
    pub async fn overall_usage_at(
        &self,
        auth: &AuthContext,
        now: DateTime<Utc>,
    ) -> AppResult<OverallUsage> {
        let user_id = auth.user_id.as_str();
        let everything = MessageFilter::default();

        let overall =
            overall_counters(self.ledger.aggregate(user_id, GroupKey::None, &everything).await?)?;

        let per_tracker = check_rows(
            self.ledger
                .aggregate(user_id, GroupKey::Tracker, &everything)
                .await?,
        )?;
        let tracker_ids: BTreeSet<String> =
            per_tracker.iter().filter_map(|row| row.key.clone()).collect();
        let directory = self.trackers.find_by_ids(&tracker_ids, user_id).await?;

        let mut by_tracker = tracker_rows(per_tracker, &directory)?;
        by_tracker.sort_by(|a, b| b.message_count.cmp(&a.message_count));

        let recent = MessageFilter::default().since(self.window_start(now));
        let mut recent_activity =
            daily_rows(self.ledger.aggregate(user_id, GroupKey::Day, &recent).await?)?;
        recent_activity.sort_by(|a, b| a.date.cmp(&b.date));

        debug!(
            total_messages = overall.total_messages,
            trackers = by_tracker.len(),
            unresolved_trackers = tracker_ids.len().saturating_sub(directory.len()),
            days = recent_activity.len(),
            "Computed overall usage"
        );

        Ok(OverallUsage {
            overall,
            by_tracker,
            recent_activity,
        })
    }

    /// Usage for one tracker the caller owns
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a malformed tracker id (before any store
    /// access), `RESOURCE_NOT_FOUND` if the caller does not own the tracker,
    /// and `DATABASE_ERROR` if storage fails
    pub async fn tracker_usage(
        &self,
        auth: &AuthContext,
        raw_tracker_id: &str,
    ) -> AppResult<TrackerUsage> {
        self.tracker_usage_at(auth, raw_tracker_id, Utc::now()).await
    }

    /// Tracker usage with the trailing window anchored at `now`
    ///
    /// # Errors
    ///
    /// See [`UsageService::tracker_usage`]
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id))]
    pub async fn tracker_usage_at(
        &self,
        auth: &AuthContext,
        raw_tracker_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<TrackerUsage> {
        let tracker_id = TrackerId::parse(raw_tracker_id)?;
        let user_id = auth.user_id.as_str();

        let tracker = self
            .trackers
            .find_one(tracker_id.as_str(), user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Tracker"))?;

        let scoped = MessageFilter::default().tracker(tracker.id.clone());

        let counters =
            overall_counters(self.ledger.aggregate(user_id, GroupKey::None, &scoped).await?)?;

        let recent = scoped.clone().since(self.window_start(now));
        let mut daily_usage =
            daily_rows(self.ledger.aggregate(user_id, GroupKey::Day, &recent).await?)?;
        daily_usage.sort_by(|a, b| b.date.cmp(&a.date));

        let messages = self
            .ledger
            .message_log(
                user_id,
                &MessageQuery {
                    filter: scoped,
                    sort: Some(SortOrder::Descending),
                    limit: Some(self.config.recent_message_limit),
                },
            )
            .await?;

        debug!(
            tracker_id = %tracker.id,
            total_messages = counters.total_messages,
            days = daily_usage.len(),
            messages = messages.len(),
            "Computed tracker usage"
        );

        Ok(TrackerUsage {
            tracker_id: tracker.id,
            tracker_name: tracker.name,
            tracker_type: tracker.tracker_type,
            counters,
            daily_usage,
            messages,
        })
    }

    /// Append one chat message to the ledger
    ///
    /// Failures are returned without logging; [`super::UsageLogger`] reports
    /// them once when it absorbs them.
    ///
    /// # Errors
    ///
    /// Returns a `DATABASE_ERROR` if the store rejects the write
    pub async fn log_message(
        &self,
        auth: &AuthContext,
        tracker_id: &str,
        role: MessageRole,
        content: &str,
    ) -> AppResult<Message> {
        self.ledger
            .append(&auth.user_id, tracker_id, role, content)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(key: Option<&str>, messages: i64, tokens: i64, user: i64, ai: i64) -> AggregateRow {
        AggregateRow {
            key: key.map(str::to_owned),
            message_count: messages,
            token_count: tokens,
            user_messages: user,
            ai_messages: ai,
        }
    }

    #[test]
    fn test_no_rows_means_zero_counters() {
        assert_eq!(overall_counters(Vec::new()).unwrap(), UsageCounters::default());
    }

    #[test]
    fn test_single_row_becomes_counters() {
        let counters = overall_counters(vec![row(None, 6, 75, 3, 3)]).unwrap();
        assert_eq!(
            counters,
            UsageCounters {
                total_messages: 6,
                total_tokens: 75,
                user_messages: 3,
                ai_messages: 3,
            }
        );
    }

    #[test]
    fn test_negative_aggregate_is_rejected() {
        let error = overall_counters(vec![row(None, 1, -5, 1, 0)]).unwrap_err();
        assert!(matches!(error, DatabaseError::InvalidData { field: "token_count", .. }));
    }

    #[test]
    fn test_role_buckets_cannot_exceed_total() {
        let error = overall_counters(vec![row(None, 2, 10, 2, 1)]).unwrap_err();
        assert!(matches!(error, DatabaseError::InvalidData { .. }));
    }

    #[test]
    fn test_daily_rows_require_calendar_day_keys() {
        assert!(daily_rows(vec![row(Some("2025-01-09"), 1, 4, 1, 0)]).is_ok());
        assert!(daily_rows(vec![row(Some("2025-13-40"), 1, 4, 1, 0)]).is_err());
        assert!(daily_rows(vec![row(None, 1, 4, 1, 0)]).is_err());
    }

    #[test]
    fn test_unresolved_tracker_falls_back_to_unknown_personal() {
        let mut directory = HashMap::new();
        directory.insert(
            "t1".to_owned(),
            Tracker {
                id: "t1".to_owned(),
                user_id: "u".to_owned(),
                name: "Household".to_owned(),
                tracker_type: TrackerType::Business,
                created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            },
        );
        let checked = check_rows(vec![
            row(Some("gone"), 1, 1, 1, 0),
            row(Some("t1"), 2, 2, 1, 1),
        ])
        .unwrap();

        let rows = tracker_rows(checked, &directory).unwrap();
        assert_eq!(rows[0].tracker_name, "Unknown");
        assert_eq!(rows[0].tracker_type, TrackerType::Personal);
        assert_eq!(rows[1].tracker_name, "Household");
        assert_eq!(rows[1].tracker_type, TrackerType::Business);
    }
}
