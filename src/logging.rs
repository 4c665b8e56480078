// ABOUTME: Logging configuration and structured logging setup for the usage service
// ABOUTME: Configures log levels, formatters, and noise filters for the tracing subscriber
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Production-ready logging configuration with structured output
//!
//! Message content is never written to logs; ledger events carry ids,
//! roles and token counts only.

use anyhow::{Context, Result};
use serde_json::json;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use tracker_core::constants::service_names;

use crate::config::LogLevel;

/// Crates whose chatter is capped regardless of `RUST_LOG`
const NOISE_DIRECTIVES: [&str; 5] = [
    "hyper=warn",
    "hyper::proto=warn",
    "sqlx=warn",
    "sqlx::query=warn",
    "tower_http=info",
];

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)] // One flag per optional fmt field
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include thread information
    pub include_thread: bool,
    /// Include span open/close events
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, production, testing)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            include_spans: false,
            service_name: service_names::EXPENSE_TRACKER.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    ///
    /// `RUST_LOG` wins; `default_level` applies when it is unset.
    #[must_use]
    pub fn from_env(default_level: LogLevel) -> Self {
        Self::from_lookup(|key| env::var(key).ok(), default_level)
    }

    /// Create logging configuration from an arbitrary variable source
    #[must_use]
    pub fn from_lookup<F>(lookup: F, default_level: LogLevel) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            Some("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".into());

        // Production always logs location, threads and spans
        let is_production = environment == "production";
        let flag = |key: &str| is_production || lookup(key).is_some();

        Self {
            level: lookup("RUST_LOG").unwrap_or_else(|| default_level.to_string()),
            format,
            include_location: flag("LOG_INCLUDE_LOCATION"),
            include_thread: flag("LOG_INCLUDE_THREAD"),
            include_spans: flag("LOG_INCLUDE_SPANS"),
            service_name: lookup("SERVICE_NAME")
                .unwrap_or_else(|| service_names::EXPENSE_TRACKER.into()),
            service_version: lookup("SERVICE_VERSION")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_owned()),
            environment,
        }
    }

    /// Filter built from `level` plus the noise-reduction directives
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        NOISE_DIRECTIVES
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(EnvFilter::new(&self.level), EnvFilter::add_directive)
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());

        match self.format {
            LogFormat::Json => {
                let json_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_thread_names(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(self.span_events())
                    .json();

                registry.with(json_layer).try_init()
            }
            LogFormat::Pretty => {
                let pretty_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_thread_names(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(self.span_events());

                registry.with(pretty_layer).try_init()
            }
            LogFormat::Compact => {
                let compact_layer = fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stdout)
                    .with_span_events(FmtSpan::NONE);

                registry.with(compact_layer).try_init()
            }
        }
        .context("Failed to install tracing subscriber")?;

        self.log_startup_info();
        Ok(())
    }

    /// Log structured startup information
    fn log_startup_info(&self) {
        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Expense tracker usage service starting up"
        );

        let config_summary = json!({
            "service": {
                "name": self.service_name,
                "version": self.service_version,
                "environment": self.environment
            },
            "logging": {
                "level": self.level,
                "format": format!("{:?}", self.format),
                "features": {
                    "location": self.include_location,
                    "thread": self.include_thread,
                    "spans": self.include_spans
                }
            }
        });

        info!("Configuration loaded: {}", config_summary);
    }
}

/// Initialize logging from environment, falling back to the configured `LOG_LEVEL`
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env(default_level: LogLevel) -> Result<()> {
    LoggingConfig::from_env(default_level).init()
}
