// ABOUTME: Message ledger service that counts tokens and appends usage records
// ABOUTME: Every read and write is scoped to the owning user id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::database::repositories::MessageRepository;
use crate::database::{AggregateRow, GroupKey, MessageFilter, MessageQuery};
use crate::errors::AppResult;
use crate::models::{Message, MessageLogEntry, MessageRole};
use crate::tokenizer::TokenCounter;
use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Append-only ledger of logged chat messages
#[derive(Clone)]
pub struct MessageLedger {
    repository: Arc<dyn MessageRepository>,
    token_counter: Arc<dyn TokenCounter>,
}

impl MessageLedger {
    /// Create a ledger over `repository`, counting tokens with `token_counter`
    #[must_use]
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        token_counter: Arc<dyn TokenCounter>,
    ) -> Self {
        Self {
            repository,
            token_counter,
        }
    }

    /// Token counter used for every append
    #[must_use]
    pub fn token_counter(&self) -> &Arc<dyn TokenCounter> {
        &self.token_counter
    }

    /// Count tokens, stamp the time, assign an id, and persist
    ///
    /// `tracker_id` is stored as given; it is only matched against the
    /// tracker directory when usage is read.
    ///
    /// # Errors
    ///
    /// Returns a `DATABASE_ERROR` if the store rejects the insert
    pub async fn append(
        &self,
        user_id: &str,
        tracker_id: &str,
        role: MessageRole,
        content: &str,
    ) -> AppResult<Message> {
        let message = Message {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            tracker_id: tracker_id.to_owned(),
            role,
            content: content.to_owned(),
            token_count: self.token_counter.count(content),
            // Storage keeps milliseconds; truncate so the returned record matches a re-read
            timestamp: Utc::now().trunc_subsecs(3),
        };

        self.repository.insert(&message).await?;

        info!(
            user_id,
            tracker_id,
            role = %role,
            token_count = message.token_count,
            "Usage message logged"
        );
        Ok(message)
    }

    /// Messages for `user_id` matching `query`
    ///
    /// # Errors
    ///
    /// Returns a `DATABASE_ERROR` if the query fails
    pub async fn query(&self, user_id: &str, query: &MessageQuery) -> AppResult<Vec<Message>> {
        Ok(self.repository.query(user_id, query).await?)
    }

    /// Message-log projection for `user_id` matching `query`
    ///
    /// # Errors
    ///
    /// Returns a `DATABASE_ERROR` if the query fails
    pub async fn message_log(
        &self,
        user_id: &str,
        query: &MessageQuery,
    ) -> AppResult<Vec<MessageLogEntry>> {
        Ok(self.repository.message_log(user_id, query).await?)
    }

    /// Grouped counters for `user_id`
    ///
    /// # Errors
    ///
    /// Returns a `DATABASE_ERROR` if the aggregation fails
    pub async fn aggregate(
        &self,
        user_id: &str,
        group: GroupKey,
        filter: &MessageFilter,
    ) -> AppResult<Vec<AggregateRow>> {
        Ok(self.repository.aggregate(user_id, group, filter).await?)
    }
}
