// ABOUTME: Message ledger repository implementation
// ABOUTME: Delegates to MessageManager for user-scoped ledger persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::MessageRepository;
use crate::database::{
    AggregateRow, Database, DatabaseError, GroupKey, MessageFilter, MessageQuery,
};
use crate::models::{Message, MessageLogEntry};
use async_trait::async_trait;

/// SQLite implementation of `MessageRepository`
pub struct MessageRepositoryImpl {
    db: Database,
}

impl MessageRepositoryImpl {
    /// Create a new `MessageRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageRepository for MessageRepositoryImpl {
    async fn insert(&self, message: &Message) -> Result<(), DatabaseError> {
        self.db.messages().insert(message).await
    }

    async fn query(
        &self,
        user_id: &str,
        query: &MessageQuery,
    ) -> Result<Vec<Message>, DatabaseError> {
        self.db.messages().query(user_id, query).await
    }

    async fn message_log(
        &self,
        user_id: &str,
        query: &MessageQuery,
    ) -> Result<Vec<MessageLogEntry>, DatabaseError> {
        self.db.messages().message_log(user_id, query).await
    }

    async fn aggregate(
        &self,
        user_id: &str,
        group: GroupKey,
        filter: &MessageFilter,
    ) -> Result<Vec<AggregateRow>, DatabaseError> {
        self.db.messages().aggregate(user_id, group, filter).await
    }
}
