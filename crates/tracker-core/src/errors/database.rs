// ABOUTME: Structured error types for ledger and tracker directory storage
// ABOUTME: Converts sqlx failures into DatabaseError and DatabaseError into AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorCode};

/// Storage-layer errors with enough context to diagnose from logs
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The store could not be reached
    #[error("Database connection failed: {context}")]
    ConnectionFailed {
        /// What was being connected to
        context: String,
    },

    /// A query or aggregation failed
    #[error("Database query failed: {context}")]
    QueryError {
        /// Operation that failed
        context: String,
    },

    /// A stored row did not match the expected shape
    #[error("Invalid data in field '{field}': {reason}")]
    InvalidData {
        /// Column or derived field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Schema migration failed
    #[error("Migration failed: {context}")]
    MigrationError {
        /// Migration step that failed
        context: String,
    },
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::ConnectionFailed {
                    context: error.to_string(),
                }
            }
            other => Self::QueryError {
                context: other.to_string(),
            },
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        Self::new(ErrorCode::DatabaseError, error.to_string()).with_source(error)
    }
}
