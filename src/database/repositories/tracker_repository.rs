// ABOUTME: Tracker directory repository implementation
// ABOUTME: Delegates to TrackerManager for owner-scoped tracker lookups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::TrackerRepository;
use crate::database::{Database, DatabaseError};
use crate::models::{Tracker, TrackerType};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};

/// SQLite implementation of `TrackerRepository`
pub struct TrackerRepositoryImpl {
    db: Database,
}

impl TrackerRepositoryImpl {
    /// Create a new `TrackerRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TrackerRepository for TrackerRepositoryImpl {
    async fn find_by_ids(
        &self,
        tracker_ids: &BTreeSet<String>,
        user_id: &str,
    ) -> Result<HashMap<String, Tracker>, DatabaseError> {
        self.db.trackers().find_by_ids(tracker_ids, user_id).await
    }

    async fn find_one(
        &self,
        tracker_id: &str,
        user_id: &str,
    ) -> Result<Option<Tracker>, DatabaseError> {
        self.db.trackers().find_one(tracker_id, user_id).await
    }

    async fn create(
        &self,
        user_id: &str,
        name: &str,
        tracker_type: TrackerType,
    ) -> Result<Tracker, DatabaseError> {
        self.db.trackers().create(user_id, name, tracker_type).await
    }

    async fn delete(&self, tracker_id: &str, user_id: &str) -> Result<bool, DatabaseError> {
        self.db.trackers().delete(tracker_id, user_id).await
    }
}
