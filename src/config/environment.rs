// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management for production deployment

use crate::errors::{AppError, AppResult};
use crate::tokenizer::TokenizerScheme;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;
use tracker_core::constants::usage::{DEFAULT_RECENT_MESSAGE_LIMIT, DEFAULT_WINDOW_DAYS};

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 8081;
/// Default database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/expense_tracker.db";
/// Default pool size for file-backed databases
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
/// Default lifetime of minted JWTs
pub const DEFAULT_JWT_EXPIRY_HOURS: u64 = 24;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database with file path
    SQLite {
        /// Database file
        path: PathBuf,
    },
    /// In-memory SQLite (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns a configuration error for anything other than a `sqlite:` URL
    pub fn parse_url(s: &str) -> AppResult<Self> {
        let Some(path_str) = s.strip_prefix("sqlite:") else {
            return Err(AppError::config_invalid(format!(
                "Unsupported DATABASE_URL '{s}': only sqlite: URLs are supported"
            )));
        };

        match path_str.trim_start_matches("//") {
            ":memory:" | "" => Ok(Self::Memory),
            path => Ok(Self::SQLite {
                path: PathBuf::from(path),
            }),
        }
    }

    /// Connection string for sqlx
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Whether the database lives only in process memory
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/expense_tracker.db"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Where the ledger and tracker directory live
    pub url: DatabaseUrl,
    /// Pool size (in-memory databases always use one connection)
    pub max_connections: u32,
}

/// Authentication configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the auth collaborator
    #[serde(skip_serializing)]
    pub jwt_secret: Option<String>,
    /// Lifetime of tokens minted by this service
    pub jwt_expiry_hours: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .finish()
    }
}

/// Usage reporting configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Trailing window for per-day rows
    pub window_days: u32,
    /// Cap on the tracker message log
    pub recent_message_limit: u32,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            recent_message_limit: DEFAULT_RECENT_MESSAGE_LIMIT,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated origins, or `*`
    pub allowed_origins: String,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Application log level
    pub log_level: LogLevel,
    /// Ledger and directory storage
    pub database: DatabaseConfig,
    /// JWT settings
    pub auth: AuthConfig,
    /// Token counting scheme, fixed for the process lifetime
    pub tokenizer: TokenizerScheme,
    /// Usage report windows and caps
    pub usage: UsageConfig,
    /// Cross-origin settings
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a variable holds an unparseable value
    /// or a production deployment has no `JWT_SECRET`
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a value cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .map(|v| Environment::from_str_or_default(&v))
            .unwrap_or_default();

        let jwt_secret = lookup("JWT_SECRET").filter(|s| !s.trim().is_empty());
        if environment.is_production() && jwt_secret.is_none() {
            return Err(AppError::config(
                "JWT_SECRET must be set when ENVIRONMENT=production",
            ));
        }

        let config = Self {
            http_port: parse_or(&lookup, "HTTP_PORT", DEFAULT_HTTP_PORT)?,
            environment,
            log_level: lookup("LOG_LEVEL")
                .map(|v| LogLevel::from_str_or_default(&v))
                .unwrap_or_default(),
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(
                    &lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned()),
                )?,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_MAX_CONNECTIONS,
                )?,
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: parse_or(&lookup, "JWT_EXPIRY_HOURS", DEFAULT_JWT_EXPIRY_HOURS)?,
            },
            tokenizer: parse_or(&lookup, "TOKENIZER", TokenizerScheme::default())?,
            usage: UsageConfig {
                window_days: parse_or(&lookup, "USAGE_WINDOW_DAYS", DEFAULT_WINDOW_DAYS)?,
                recent_message_limit: parse_or(
                    &lookup,
                    "USAGE_RECENT_MESSAGE_LIMIT",
                    DEFAULT_RECENT_MESSAGE_LIMIT,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_owned()),
            },
        };

        if config.usage.window_days == 0 {
            return Err(AppError::config_invalid(
                "USAGE_WINDOW_DAYS must be at least 1",
            ));
        }

        Ok(config)
    }

    /// Configuration used by tests: in-memory database, fixed secret
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            http_port: 0,
            environment: Environment::Testing,
            log_level: LogLevel::Warn,
            database: DatabaseConfig {
                url: DatabaseUrl::Memory,
                max_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: Some("test-secret-not-for-production".to_owned()),
                jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
            },
            tokenizer: TokenizerScheme::default(),
            usage: UsageConfig::default(),
            cors: CorsConfig {
                allowed_origins: "*".to_owned(),
            },
        }
    }

    /// Human-readable configuration summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Expense Tracker Usage Service Configuration:\n\
             - HTTP Port: {}\n\
             - Environment: {}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - Tokenizer: {}\n\
             - Usage Window: {} days\n\
             - Message Log Limit: {}\n\
             - JWT Secret: {}",
            self.http_port,
            self.environment,
            self.log_level,
            if self.database.url.is_memory() {
                "SQLite (in-memory)"
            } else {
                "SQLite"
            },
            self.tokenizer,
            self.usage.window_days,
            self.usage.recent_message_limit,
            if self.auth.jwt_secret.is_some() {
                "configured"
            } else {
                "generated (process-local)"
            },
        )
    }
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| AppError::config_invalid(format!("Invalid {key} value '{raw}': {e}")))
    })
}
