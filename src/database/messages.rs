// ABOUTME: Database operations for the append-only usage message ledger
// ABOUTME: Inserts messages, runs filtered queries, and groups counters by tracker or day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{decode_timestamp, encode_timestamp, DatabaseError};
use crate::models::{Message, MessageLogEntry, MessageRole};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

/// Grouping applied by [`MessageManager::aggregate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// One row over every matching message
    None,
    /// One row per `tracker_id`
    Tracker,
    /// One row per UTC calendar day (`YYYY-MM-DD`)
    Day,
}

impl GroupKey {
    const fn key_expression(self) -> &'static str {
        match self {
            Self::None => "NULL",
            Self::Tracker => "tracker_id",
            Self::Day => "strftime('%Y-%m-%d', timestamp)",
        }
    }
}

/// Optional narrowing beyond the mandatory user id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    /// Only messages logged under this tracker
    pub tracker_id: Option<String>,
    /// Only messages at or after this instant
    pub since: Option<DateTime<Utc>>,
}

impl MessageFilter {
    /// Restrict to one tracker
    #[must_use]
    pub fn tracker(mut self, tracker_id: impl Into<String>) -> Self {
        self.tracker_id = Some(tracker_id.into());
        self
    }

    /// Restrict to messages at or after `since`
    #[must_use]
    pub const fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }
}

/// Timestamp ordering for message queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first
    #[default]
    Ascending,
    /// Newest first
    Descending,
}

impl SortOrder {
    const fn sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Filter, ordering and cap for [`MessageManager::query`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQuery {
    /// Which messages
    pub filter: MessageFilter,
    /// Timestamp order; `None` leaves storage order
    pub sort: Option<SortOrder>,
    /// Maximum rows returned
    pub limit: Option<u32>,
}

/// One aggregation output row, exactly as the SQL produced it
///
/// `key` is `None` for [`GroupKey::None`]. Counters are raw `i64`s; the
/// aggregator validates them before building response rows.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AggregateRow {
    /// Group key (tracker id or day)
    #[sqlx(rename = "group_key")]
    pub key: Option<String>,
    /// Matching messages
    pub message_count: i64,
    /// Sum of token counts
    pub token_count: i64,
    /// Messages with role `user`
    pub user_messages: i64,
    /// Messages with role `assistant`
    pub ai_messages: i64,
}

/// Ledger database operations
pub struct MessageManager {
    pool: SqlitePool,
}

impl MessageManager {
    /// Create a new message manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a fully-built message
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn insert(&self, message: &Message) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            INSERT INTO usage_messages (id, user_id, tracker_id, role, content, token_count, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&message.id)
        .bind(&message.user_id)
        .bind(&message.tracker_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(i64::from(message.token_count))
        .bind(encode_timestamp(message.timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError {
            context: format!("Failed to insert usage message: {e}"),
        })?;

        Ok(())
    }

    /// Fetch full messages for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row holds a role or
    /// timestamp this service cannot represent
    pub async fn query(
        &self,
        user_id: &str,
        query: &MessageQuery,
    ) -> Result<Vec<Message>, DatabaseError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, user_id, tracker_id, role, content, token_count, timestamp FROM usage_messages",
        );
        push_filter(&mut builder, user_id, &query.filter);
        push_order_and_limit(&mut builder, query);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError {
                context: format!("Failed to query usage messages: {e}"),
            })?;

        rows.iter()
            .map(|row| -> Result<Message, DatabaseError> {
                let role: String = row.try_get("role")?;
                let timestamp: String = row.try_get("timestamp")?;
                let token_count: i64 = row.try_get("token_count")?;
                Ok(Message {
                    id: row.try_get("id")?,
                    user_id: row.try_get("user_id")?,
                    tracker_id: row.try_get("tracker_id")?,
                    role: role
                        .parse::<MessageRole>()
                        .map_err(|reason| DatabaseError::InvalidData {
                            field: "role",
                            reason,
                        })?,
                    content: row.try_get("content")?,
                    token_count: token_count_from_i64(token_count)?,
                    timestamp: decode_timestamp("timestamp", &timestamp)?,
                })
            })
            .collect()
    }

    /// Fetch the message-log projection (`role`, `content`, `token_count`, `timestamp`)
    ///
    /// The role is returned as stored, so foreign role values do not fail the read.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored timestamp is unreadable
    pub async fn message_log(
        &self,
        user_id: &str,
        query: &MessageQuery,
    ) -> Result<Vec<MessageLogEntry>, DatabaseError> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT role, content, token_count, timestamp FROM usage_messages");
        push_filter(&mut builder, user_id, &query.filter);
        push_order_and_limit(&mut builder, query);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError {
                context: format!("Failed to query message log: {e}"),
            })?;

        rows.iter()
            .map(|row| -> Result<MessageLogEntry, DatabaseError> {
                let timestamp: String = row.try_get("timestamp")?;
                let token_count: i64 = row.try_get("token_count")?;
                Ok(MessageLogEntry {
                    role: row.try_get("role")?,
                    content: row.try_get("content")?,
                    token_count: token_count_from_i64(token_count)?,
                    timestamp: decode_timestamp("timestamp", &timestamp)?,
                })
            })
            .collect()
    }

    /// Count messages and tokens for a user, grouped by `group`
    ///
    /// Rows come back ordered by key. An empty match yields no rows for
    /// every grouping, including [`GroupKey::None`].
    ///
    /// # Errors
    ///
    /// Returns an error if the aggregation query fails
    pub async fn aggregate(
        &self,
        user_id: &str,
        group: GroupKey,
        filter: &MessageFilter,
    ) -> Result<Vec<AggregateRow>, DatabaseError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
        builder
            .push(group.key_expression())
            .push(
                r" AS group_key,
                   COUNT(*) AS message_count,
                   COALESCE(SUM(token_count), 0) AS token_count,
                   COALESCE(SUM(CASE WHEN role = 'user' THEN 1 ELSE 0 END), 0) AS user_messages,
                   COALESCE(SUM(CASE WHEN role = 'assistant' THEN 1 ELSE 0 END), 0) AS ai_messages
                FROM usage_messages",
            );
        push_filter(&mut builder, user_id, filter);
        if group != GroupKey::None {
            builder.push(" GROUP BY group_key ORDER BY group_key ASC");
        }

        let mut rows: Vec<AggregateRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError {
                context: format!("Failed to aggregate usage messages: {e}"),
            })?;

        // An ungrouped aggregate over nothing still produces one all-zero row
        rows.retain(|row| row.message_count > 0);

        debug!(
            user_id,
            group = ?group,
            tracker_id = filter.tracker_id.as_deref(),
            rows = rows.len(),
            "Aggregated usage messages"
        );
        Ok(rows)
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, user_id: &str, filter: &MessageFilter) {
    builder.push(" WHERE user_id = ").push_bind(user_id.to_owned());
    if let Some(tracker_id) = &filter.tracker_id {
        builder.push(" AND tracker_id = ").push_bind(tracker_id.clone());
    }
    if let Some(since) = filter.since {
        builder
            .push(" AND timestamp >= ")
            .push_bind(encode_timestamp(since));
    }
}

fn push_order_and_limit(builder: &mut QueryBuilder<'_, Sqlite>, query: &MessageQuery) {
    if let Some(sort) = query.sort {
        builder.push(" ORDER BY timestamp ").push(sort.sql());
    }
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(i64::from(limit));
    }
}

fn token_count_from_i64(raw: i64) -> Result<u32, DatabaseError> {
    u32::try_from(raw).map_err(|_| DatabaseError::InvalidData {
        field: "token_count",
        reason: format!("{raw} is outside 0..=u32::MAX"),
    })
}
