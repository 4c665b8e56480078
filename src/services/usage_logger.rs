// ABOUTME: Best-effort usage logging for the chat pipeline
// ABOUTME: Records both sides of a chat turn and reports failures instead of propagating them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Usage Logger
//!
//! The chat pipeline must answer the user even when the ledger is down.
//! [`UsageLogger`] calls the strict [`UsageService::log_message`] for each
//! role and hands any failure to an [`ErrorReporter`].

use super::UsageService;
use crate::auth::AuthContext;
use crate::errors::AppError;
use crate::models::MessageRole;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, warn};

/// Outcome of recording one chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnOutcome {
    /// Messages written to the ledger (0, 1 or 2)
    pub logged: u8,
    /// Messages whose write failed and was reported
    pub failed: u8,
}

impl TurnOutcome {
    /// Whether both messages were written
    #[must_use]
    pub const fn is_complete(self) -> bool {
        self.failed == 0
    }
}

/// Sink for absorbed logging failures
pub trait ErrorReporter: Send + Sync {
    /// Report a failed ledger write
    fn report(&self, context: &AuthContext, tracker_id: &str, role: MessageRole, error: &AppError);
}

/// Reports failures as structured `tracing` error events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, context: &AuthContext, tracker_id: &str, role: MessageRole, error: &AppError) {
        error!(
            user_id = %context.user_id,
            tracker_id,
            role = %role,
            code = ?error.code,
            "Usage logging failed; chat turn continues: {error}"
        );
    }
}

/// Fire-and-forget logger used after every chat turn
#[derive(Clone)]
pub struct UsageLogger {
    usage: UsageService,
    reporter: Arc<dyn ErrorReporter>,
}

impl UsageLogger {
    /// Logger reporting failures through `tracing`
    #[must_use]
    pub fn new(usage: UsageService) -> Self {
        Self::with_reporter(usage, Arc::new(TracingErrorReporter))
    }

    /// Logger reporting failures to `reporter`
    #[must_use]
    pub fn with_reporter(usage: UsageService, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { usage, reporter }
    }

    /// Log the user's message, then the assistant's reply
    ///
    /// Never fails; each failed write goes to the reporter and the other
    /// role is still attempted.
    pub async fn record_turn(
        &self,
        context: &AuthContext,
        tracker_id: &str,
        user_content: &str,
        assistant_content: &str,
    ) -> TurnOutcome {
        let mut outcome = TurnOutcome::default();
        for (role, content) in [
            (MessageRole::User, user_content),
            (MessageRole::Assistant, assistant_content),
        ] {
            match self.usage.log_message(context, tracker_id, role, content).await {
                Ok(_) => outcome.logged += 1,
                Err(e) => {
                    outcome.failed += 1;
                    self.reporter.report(context, tracker_id, role, &e);
                }
            }
        }

        if !outcome.is_complete() {
            warn!(
                user_id = %context.user_id,
                tracker_id,
                failed = outcome.failed,
                "Chat turn only partially recorded"
            );
        }
        outcome
    }

    /// Run [`UsageLogger::record_turn`] on a background task
    ///
    /// The handle may be dropped; the write still completes.
    #[must_use = "drop the handle explicitly if the outcome is not needed"]
    pub fn spawn_record_turn(
        &self,
        context: AuthContext,
        tracker_id: String,
        user_content: String,
        assistant_content: String,
    ) -> JoinHandle<TurnOutcome> {
        let logger = self.clone();
        tokio::spawn(async move {
            logger
                .record_turn(&context, &tracker_id, &user_content, &assistant_content)
                .await
        })
    }
}
