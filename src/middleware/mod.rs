// ABOUTME: HTTP middleware for request tracing and cross-origin access
// ABOUTME: Provides request ID generation, request spans, and CORS configuration

pub mod cors;
pub mod tracing;

// CORS configuration
pub use self::cors::setup_cors;

// Request tracing and correlation
pub use self::tracing::{create_request_span, with_request_tracing, REQUEST_ID_HEADER};
