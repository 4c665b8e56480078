// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Generates request IDs and wraps every HTTP request in a span

use axum::Router;
use http::{header::HeaderName, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

/// Header carrying the request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create a tracing span for HTTP requests
///
/// The request id is set by [`SetRequestIdLayer`] before the span is built;
/// `user_id` is recorded by handlers once the caller is authenticated.
#[must_use]
pub fn create_request_span<B>(request: &Request<B>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        user_id = tracing::field::Empty,
    )
}

/// Add request-id generation, request spans, and id echoing to `router`
///
/// Incoming `x-request-id` values are kept; missing ones get a UUID.
#[must_use]
pub fn with_request_tracing(router: Router) -> Router {
    let header = HeaderName::from_static(REQUEST_ID_HEADER);

    router
        .layer(PropagateRequestIdLayer::new(header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(create_request_span::<axum::body::Body>)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(header, MakeRequestUuid))
}
