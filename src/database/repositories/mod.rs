// ABOUTME: Repository traits over the ledger and the tracker directory
// ABOUTME: Services depend on these seams so tests can substitute storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

mod message_repository;
mod tracker_repository;

pub use message_repository::MessageRepositoryImpl;
pub use tracker_repository::TrackerRepositoryImpl;

use super::{AggregateRow, DatabaseError, GroupKey, MessageFilter, MessageQuery};
use crate::models::{Message, MessageLogEntry, Tracker, TrackerType};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};

/// Append-only message ledger storage
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist one message
    async fn insert(&self, message: &Message) -> Result<(), DatabaseError>;

    /// Full messages for `user_id` matching `query`
    async fn query(&self, user_id: &str, query: &MessageQuery)
        -> Result<Vec<Message>, DatabaseError>;

    /// Message-log projection for `user_id` matching `query`
    async fn message_log(
        &self,
        user_id: &str,
        query: &MessageQuery,
    ) -> Result<Vec<MessageLogEntry>, DatabaseError>;

    /// Grouped counters for `user_id`, ordered by group key
    async fn aggregate(
        &self,
        user_id: &str,
        group: GroupKey,
        filter: &MessageFilter,
    ) -> Result<Vec<AggregateRow>, DatabaseError>;
}

/// Owner-scoped tracker directory
#[async_trait]
pub trait TrackerRepository: Send + Sync {
    /// Trackers owned by `user_id` among `tracker_ids`, keyed by id
    async fn find_by_ids(
        &self,
        tracker_ids: &BTreeSet<String>,
        user_id: &str,
    ) -> Result<HashMap<String, Tracker>, DatabaseError>;

    /// One tracker, only if `user_id` owns it
    async fn find_one(
        &self,
        tracker_id: &str,
        user_id: &str,
    ) -> Result<Option<Tracker>, DatabaseError>;

    /// Create a tracker for `user_id`
    async fn create(
        &self,
        user_id: &str,
        name: &str,
        tracker_type: TrackerType,
    ) -> Result<Tracker, DatabaseError>;

    /// Delete a tracker; returns whether a row was removed
    async fn delete(&self, tracker_id: &str, user_id: &str) -> Result<bool, DatabaseError>;
}
