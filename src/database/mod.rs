// ABOUTME: SQLite storage for the usage ledger and the tracker directory
// ABOUTME: Owns the connection pool, runs idempotent migrations, and hands out table managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! The ledger (`usage_messages`) and the tracker directory (`trackers`) share
//! one pool. Every query filters by `user_id`; tenant isolation lives in the
//! SQL, not in callers.

mod messages;
mod trackers;

/// Repository traits and their SQLite implementations
pub mod repositories;

pub use messages::{AggregateRow, GroupKey, MessageFilter, MessageManager, MessageQuery, SortOrder};
pub use trackers::TrackerManager;
pub use tracker_core::errors::DatabaseError;

use crate::config::DatabaseUrl;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// Database manager for the ledger and tracker directory
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run migrations
    ///
    /// In-memory databases are pinned to a single connection; every pooled
    /// connection to `sqlite::memory:` would otherwise see its own empty
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(url: &DatabaseUrl, max_connections: u32) -> Result<Self, DatabaseError> {
        let connection_string = url.to_connection_string();

        if let DatabaseUrl::SQLite { path } = url {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| DatabaseError::ConnectionFailed {
                    context: format!("cannot create {}: {e}", parent.display()),
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| DatabaseError::ConnectionFailed {
                context: format!("invalid database url {connection_string}: {e}"),
            })?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new();
        let max_connections = if url.is_memory() {
            // The database lives only as long as its one connection
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
            1
        } else {
            max_connections.max(1)
        };

        let pool = pool_options
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed {
                context: format!("{connection_string}: {e}"),
            })?;

        let db = Self { pool };
        db.migrate().await?;

        info!(
            database = %connection_string,
            max_connections,
            "Database initialized"
        );
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Ledger table manager
    #[must_use]
    pub fn messages(&self) -> MessageManager {
        MessageManager::new(self.pool.clone())
    }

    /// Tracker directory table manager
    #[must_use]
    pub fn trackers(&self) -> TrackerManager {
        TrackerManager::new(self.pool.clone())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        self.migrate_messages().await?;
        self.migrate_trackers().await?;
        Ok(())
    }

    async fn migrate_messages(&self) -> Result<(), DatabaseError> {
        // role has no CHECK constraint: rows from other writers must still aggregate
        self.execute_ddl(
            "create usage_messages",
            r"
            CREATE TABLE IF NOT EXISTS usage_messages (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                tracker_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                token_count INTEGER NOT NULL DEFAULT 0 CHECK (token_count >= 0),
                timestamp TEXT NOT NULL
            )
            ",
        )
        .await?;

        self.execute_ddl(
            "index usage_messages user/timestamp",
            "CREATE INDEX IF NOT EXISTS idx_usage_messages_user_ts ON usage_messages(user_id, timestamp)",
        )
        .await?;

        self.execute_ddl(
            "index usage_messages user/tracker/timestamp",
            "CREATE INDEX IF NOT EXISTS idx_usage_messages_user_tracker_ts ON usage_messages(user_id, tracker_id, timestamp)",
        )
        .await
    }

    async fn migrate_trackers(&self) -> Result<(), DatabaseError> {
        self.execute_ddl(
            "create trackers",
            r"
            CREATE TABLE IF NOT EXISTS trackers (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                type TEXT NOT NULL DEFAULT 'personal',
                created_at TEXT NOT NULL
            )
            ",
        )
        .await?;

        self.execute_ddl(
            "index trackers user",
            "CREATE INDEX IF NOT EXISTS idx_trackers_user ON trackers(user_id)",
        )
        .await
    }

    async fn execute_ddl(&self, step: &str, sql: &str) -> Result<(), DatabaseError> {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::MigrationError {
                context: format!("{step}: {e}"),
            })?;
        Ok(())
    }
}

/// Storage form of a timestamp: RFC 3339, UTC, millisecond precision
///
/// Lexical order of the stored text equals chronological order, and
/// `strftime('%Y-%m-%d', timestamp)` yields the UTC calendar day.
pub(crate) fn encode_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp
pub(crate) fn decode_timestamp(
    field: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::InvalidData {
            field,
            reason: format!("'{raw}' is not an RFC 3339 timestamp: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_encoding_is_sortable_and_reversible() {
        let early = Utc.with_ymd_and_hms(2025, 1, 9, 23, 59, 59).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();

        let early_text = encode_timestamp(early);
        let late_text = encode_timestamp(late);

        assert_eq!(early_text, "2025-01-09T23:59:59.000Z");
        assert!(early_text < late_text);
        assert_eq!(decode_timestamp("timestamp", &late_text).unwrap(), late);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let error = decode_timestamp("timestamp", "yesterday").unwrap_err();
        assert!(matches!(error, DatabaseError::InvalidData { field: "timestamp", .. }));
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new(&DatabaseUrl::Memory, 4).await.unwrap();
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();
    }
}
