// ABOUTME: JWT authentication resolving bearer tokens into an immutable request context
// ABOUTME: Issues and validates HS256 tokens shared with the session collaborator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Authentication
//!
//! Requests carry `Authorization: Bearer <jwt>`. The token is validated once
//! per request and turned into an [`AuthContext`] that handlers pass by
//! reference into every service call.

use crate::config::AuthConfig;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use http::HeaderMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Bytes of randomness in a generated development secret
const GENERATED_SECRET_BYTES: usize = 32;

/// JWT claims shared with the session collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// Phone number the session was opened with
    #[serde(default)]
    pub phone: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated caller, resolved once per request and never mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Owning user for every ledger and directory access
    pub user_id: String,
    /// Phone number from the session
    pub phone: String,
}

impl AuthContext {
    /// Build a context directly, for internal callers that already trust the user id
    #[must_use]
    pub fn new(user_id: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            phone: phone.into(),
        }
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            phone: claims.phone,
        }
    }
}

/// Authentication manager for HS256 JWT tokens
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
        }
    }

    /// Create a manager from configuration, generating a secret when none is set
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        let secret = resolve_jwt_secret(config);
        let expiry = i64::try_from(config.jwt_expiry_hours).unwrap_or(i64::MAX / 3600);
        Self::new(secret.as_bytes(), expiry)
    }

    /// Generate a token for a user, issued now
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token(&self, user_id: &str, phone: &str) -> AppResult<String> {
        self.generate_token_at(user_id, phone, Utc::now())
    }

    /// Generate a token for a user as if issued at `issued_at`
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token_at(
        &self,
        user_id: &str,
        phone: &str,
        issued_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let expiry = issued_at + Duration::hours(self.token_expiry_hours);
        let claims = Claims {
            sub: user_id.to_owned(),
            phone: phone.to_owned(),
            iat: issued_at.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AUTH_INVALID` if the token is malformed, forged, expired, or
    /// has no subject
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            warn!("JWT validation failed: {e}");
            AppError::auth_invalid("Invalid or expired token")
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(AppError::auth_invalid("Token has no subject"));
        }
        Ok(data.claims)
    }

    /// Resolve the caller from request headers
    ///
    /// # Errors
    ///
    /// Returns `AUTH_REQUIRED` without an `Authorization` header and
    /// `AUTH_INVALID` for anything other than a valid bearer token
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthContext> {
        let Some(header) = headers.get(http::header::AUTHORIZATION) else {
            debug!("Authentication failed: missing authorization header");
            return Err(AppError::auth_required());
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                warn!("Authentication failed: authorization header is not a bearer token");
                AppError::auth_invalid("Invalid authorization header format")
            })?;

        let context = AuthContext::from(self.validate_token(token)?);
        debug!(user_id = %context.user_id, "Request authenticated");
        Ok(context)
    }
}

/// The configured secret, or a random per-process secret outside production
///
/// A generated secret invalidates every token on restart; production startup
/// refuses to run without `JWT_SECRET`, so this only happens in development.
#[must_use]
pub fn resolve_jwt_secret(config: &AuthConfig) -> String {
    config.jwt_secret.clone().unwrap_or_else(|| {
        warn!("JWT_SECRET not set; generating a per-process secret");
        let bytes: [u8; GENERATED_SECRET_BYTES] = rand::random();
        hex::encode(bytes)
    })
}
