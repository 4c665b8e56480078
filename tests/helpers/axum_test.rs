// ABOUTME: In-process request helpers for driving the usage router in tests
// ABOUTME: Builds requests, runs them through tower's oneshot, and buffers the response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Method, Request, Response},
    Router,
};
use serde::de::DeserializeOwned;
use tower::ServiceExt;

/// Request against a router, sent without binding a socket
pub struct TestRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
}

impl TestRequest {
    fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_owned(),
            headers: Vec::new(),
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    /// CORS preflight
    pub fn options(uri: &str) -> Self {
        Self::new(Method::OPTIONS, uri)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub async fn send(self, router: Router) -> TestResponse {
        let request = self
            .headers
            .iter()
            .fold(
                Request::builder().method(self.method).uri(&self.uri),
                |builder, (name, value)| builder.header(name, value),
            )
            .body(Body::empty())
            .unwrap();

        TestResponse::read(router.oneshot(request).await.unwrap()).await
    }
}

/// Status, headers and fully buffered body of a routed request
pub struct TestResponse {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    async fn read(response: Response<Body>) -> Self {
        let (parts, body) = response.into_parts();
        let body = to_bytes(body, usize::MAX).await.unwrap().to_vec();
        Self {
            status: parts.status.as_u16(),
            headers: parts.headers,
            body,
        }
    }

    pub const fn status(&self) -> u16 {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    }

    pub fn json<T: DeserializeOwned>(self) -> T {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "status {} body is not the expected JSON ({e}): {}",
                self.status,
                String::from_utf8_lossy(&self.body)
            )
        })
    }
}
