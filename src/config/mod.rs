// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Environment-only configuration for the usage accounting service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! All settings come from environment variables; there is no config file.

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AuthConfig, CorsConfig, DatabaseConfig, DatabaseUrl, Environment, LogLevel, ServerConfig,
    UsageConfig,
};
