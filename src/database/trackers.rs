// ABOUTME: Database operations for the tracker directory
// ABOUTME: Owner-scoped tracker lookups plus the create/delete calls used by the tracker CRUD layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{decode_timestamp, encode_timestamp, DatabaseError};
use crate::models::{Tracker, TrackerType};
use chrono::{SubsecRound, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Tracker directory database operations
pub struct TrackerManager {
    pool: SqlitePool,
}

impl TrackerManager {
    /// Create a new tracker manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a tracker owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create(
        &self,
        user_id: &str,
        name: &str,
        tracker_type: TrackerType,
    ) -> Result<Tracker, DatabaseError> {
        let tracker = Tracker {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            name: name.to_owned(),
            tracker_type,
            created_at: Utc::now().trunc_subsecs(3),
        };

        sqlx::query(
            r"
            INSERT INTO trackers (id, user_id, name, type, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&tracker.id)
        .bind(&tracker.user_id)
        .bind(&tracker.name)
        .bind(tracker.tracker_type.as_str())
        .bind(encode_timestamp(tracker.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError {
            context: format!("Failed to create tracker: {e}"),
        })?;

        Ok(tracker)
    }

    /// Delete a tracker owned by `user_id`; messages logged under it are untouched
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete(&self, tracker_id: &str, user_id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM trackers WHERE id = $1 AND user_id = $2")
            .bind(tracker_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError {
                context: format!("Failed to delete tracker: {e}"),
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Get a tracker by ID, only if `user_id` owns it
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn find_one(
        &self,
        tracker_id: &str,
        user_id: &str,
    ) -> Result<Option<Tracker>, DatabaseError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, type, created_at
            FROM trackers
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(tracker_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError {
            context: format!("Failed to get tracker: {e}"),
        })?;

        row.as_ref().map(tracker_from_row).transpose()
    }

    /// Resolve many tracker IDs at once
    ///
    /// IDs that do not exist or belong to someone else are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn find_by_ids(
        &self,
        tracker_ids: &BTreeSet<String>,
        user_id: &str,
    ) -> Result<HashMap<String, Tracker>, DatabaseError> {
        if tracker_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, user_id, name, type, created_at FROM trackers WHERE user_id = ",
        );
        builder.push_bind(user_id.to_owned()).push(" AND id IN (");
        let mut separated = builder.separated(", ");
        for tracker_id in tracker_ids {
            separated.push_bind(tracker_id.clone());
        }
        separated.push_unseparated(")");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError {
                context: format!("Failed to resolve trackers: {e}"),
            })?;

        rows.iter()
            .map(|row| tracker_from_row(row).map(|tracker| (tracker.id.clone(), tracker)))
            .collect()
    }
}

fn tracker_from_row(row: &SqliteRow) -> Result<Tracker, DatabaseError> {
    let tracker_type: String = row.try_get("type")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(Tracker {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        tracker_type: TrackerType::from_str_or_default(&tracker_type),
        created_at: decode_timestamp("created_at", &created_at)?,
    })
}
