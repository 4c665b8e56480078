// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory resources, auth headers, and ledger seeding helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `expense_tracker`
//!
//! Resources use the `estimate` tokenizer so token counts follow directly
//! from text length: [`text_with_tokens`] builds content of an exact size.

use anyhow::Result;
use chrono::{DateTime, Utc};
use expense_tracker::{
    auth::{AuthContext, AuthManager},
    config::environment::ServerConfig,
    database::Database,
    models::{Message, MessageRole, Tracker, TrackerType},
    resources::ServerResources,
    tokenizer::{EstimateTokenCounter, TokenizerScheme},
};
use std::sync::{Arc, Once};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Test configuration: in-memory database, fixed secret, estimate tokenizer
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::for_testing();
    config.tokenizer = TokenizerScheme::Estimate;
    config
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    let config = test_config();
    Ok(Database::new(&config.database.url, config.database.max_connections).await?)
}

/// Server resources over a fresh in-memory database
pub async fn create_test_server_resources() -> Result<Arc<ServerResources>> {
    create_test_server_resources_with(test_config()).await
}

/// Server resources over a fresh in-memory database with a custom configuration
pub async fn create_test_server_resources_with(
    config: ServerConfig,
) -> Result<Arc<ServerResources>> {
    init_test_logging();
    let database = Database::new(&config.database.url, config.database.max_connections).await?;
    let config = Arc::new(config);
    let auth_manager = AuthManager::from_config(&config.auth);
    Ok(Arc::new(ServerResources::new(
        database,
        auth_manager,
        Arc::new(EstimateTokenCounter),
        config,
    )))
}

/// A fresh random user
pub fn new_user() -> AuthContext {
    AuthContext::new(Uuid::new_v4().to_string(), "+15550100")
}

/// `Authorization` header value for `user`
pub fn bearer_for(resources: &ServerResources, user: &AuthContext) -> String {
    let token = resources
        .auth_manager
        .generate_token(&user.user_id, &user.phone)
        .unwrap();
    format!("Bearer {token}")
}

/// Text that the estimate tokenizer counts as exactly `tokens` tokens
pub fn text_with_tokens(tokens: usize) -> String {
    "abcd".repeat(tokens)
}

/// Create a tracker owned by `user`
pub async fn create_tracker(
    resources: &ServerResources,
    user: &AuthContext,
    name: &str,
    tracker_type: TrackerType,
) -> Tracker {
    resources
        .usage_service
        .trackers()
        .create(&user.user_id, name, tracker_type)
        .await
        .unwrap()
}

/// Log one message with an exact token count through the strict path
pub async fn log_tokens(
    resources: &ServerResources,
    user: &AuthContext,
    tracker_id: &str,
    role: MessageRole,
    tokens: usize,
) -> Message {
    resources
        .usage_service
        .log_message(user, tracker_id, role, &text_with_tokens(tokens))
        .await
        .unwrap()
}

/// Insert a message with an arbitrary timestamp and raw role, bypassing the ledger
///
/// Stands in for rows written by other writers or on earlier days.
pub async fn insert_raw_message(
    database: &Database,
    user_id: &str,
    tracker_id: &str,
    role: &str,
    token_count: i64,
    timestamp: DateTime<Utc>,
) {
    sqlx::query(
        "INSERT INTO usage_messages (id, user_id, tracker_id, role, content, token_count, timestamp)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(tracker_id)
    .bind(role)
    .bind("seeded")
    .bind(token_count)
    .bind(timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    .execute(database.pool())
    .await
    .unwrap();
}
