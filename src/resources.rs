// ABOUTME: Shared server resources handed to every route handler
// ABOUTME: Wires the database, token counter, auth manager, and usage services together once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::repositories::{MessageRepositoryImpl, TrackerRepositoryImpl};
use crate::database::Database;
use crate::errors::AppResult;
use crate::services::{MessageLedger, UsageLogger, UsageService};
use crate::tokenizer::{build_token_counter, TokenCounter};
use std::sync::Arc;

/// Centralized resource container, created once at startup
#[derive(Clone)]
pub struct ServerResources {
    /// Ledger and tracker directory store
    pub database: Arc<Database>,
    /// Bearer token validation
    pub auth_manager: Arc<AuthManager>,
    /// Usage aggregation and strict message logging
    pub usage_service: UsageService,
    /// Best-effort logging for the chat pipeline
    pub usage_logger: UsageLogger,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Assemble resources from already-built parts
    #[must_use]
    pub fn new(
        database: Database,
        auth_manager: AuthManager,
        token_counter: Arc<dyn TokenCounter>,
        config: Arc<ServerConfig>,
    ) -> Self {
        let ledger = MessageLedger::new(
            Arc::new(MessageRepositoryImpl::new(database.clone())),
            token_counter,
        );
        let usage_service = UsageService::new(
            ledger,
            Arc::new(TrackerRepositoryImpl::new(database.clone())),
            config.usage,
        );
        let usage_logger = UsageLogger::new(usage_service.clone());

        Self {
            database: Arc::new(database),
            auth_manager: Arc::new(auth_manager),
            usage_service,
            usage_logger,
            config,
        }
    }

    /// Connect to the database, load the tokenizer, and build everything
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated, or the
    /// tokenizer vocabulary fails to load
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let database =
            Database::new(&config.database.url, config.database.max_connections).await?;
        let token_counter = build_token_counter(config.tokenizer)?;
        let auth_manager = AuthManager::from_config(&config.auth);
        Ok(Self::new(
            database,
            auth_manager,
            token_counter,
            Arc::new(config),
        ))
    }
}
