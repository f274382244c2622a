//! Transport traits and implementations for talking to a router.
//!
//! This module provides the [`Transport`] trait and implementations for
//! sending REST requests. The primary implementation is
//! [`http::HttpTransport`], which speaks HTTP(S) to the router's `www` or
//! `www-ssl` service.
//!
//! # Testing
//!
//! Use [`MockTransport`] for testing without a router:
//!
//! ```
//! use roskit::backend::{MockTransport, Request, Transport};
//! use roskit::Method;
//!
//! let mock = MockTransport::new();
//! mock.respond(200, r#"[{".id":"*1","name":"ether1"}]"#);
//!
//! let response = mock.send(&Request::new(Method::Get, "/interface/ethernet")).unwrap();
//! assert_eq!(response.status, 200);
//! assert_eq!(mock.requests().len(), 1);
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::types::Method;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One REST request, relative to `/rest`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Menu path, optionally followed by `/<id>`
    pub path: String,
    /// Query parameters, used as `print` filters
    pub query: Vec<(String, String)>,
    /// JSON body for `PUT` and `PATCH`
    pub body: Option<serde_json::Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Add a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status and raw body of a REST response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert a non-success status into an error.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::from_response(self.status, &self.body))
        }
    }
}

/// Transport trait for sending REST requests.
///
/// A non-2xx status is returned as a [`Response`], not an error; only
/// failures to get an answer are errors.
pub trait Transport: Send + Sync {
    fn send(&self, request: &Request) -> Result<Response>;
}

/// Mock transport for testing without network access.
///
/// Responses are served in the order they were queued. Every request is
/// recorded. Clones share the same queue and log.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<Result<Response>>,
    requests: Vec<Request>,
}

impl MockTransport {
    /// Create a new mock transport with nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a response.
    pub fn respond(&self, status: u16, body: impl Into<String>) {
        self.lock().responses.push_back(Ok(Response {
            status,
            body: body.into(),
        }));
    }

    /// Queue a transport-level failure.
    pub fn fail(&self, message: impl Into<String>) {
        self.lock()
            .responses
            .push_back(Err(Error::Network(message.into())));
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    /// Number of queued responses not yet served.
    pub fn pending(&self) -> usize {
        self.lock().responses.len()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        let mut state = self.lock();
        state.requests.push(request.clone());
        state.responses.pop_front().unwrap_or_else(|| {
            Err(Error::Network(format!(
                "mock transport: no response queued for {} {}",
                request.method, request.path
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_transport_serves_in_order() {
        let mock = MockTransport::new();
        mock.respond(200, "[]");
        mock.respond(404, "{}");

        let first = mock.send(&Request::new(Method::Get, "/a")).unwrap();
        let second = mock.send(&Request::new(Method::Get, "/b")).unwrap();
        assert_eq!(first.status, 200);
        assert_eq!(second.status, 404);
        assert_eq!(mock.pending(), 0);

        let paths: Vec<_> = mock.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/a", "/b"]);
    }

    #[test]
    fn test_mock_transport_empty_queue() {
        let mock = MockTransport::new();
        let err = mock.send(&Request::new(Method::Get, "/a")).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_mock_transport_fail() {
        let mock = MockTransport::new();
        mock.fail("connection refused");
        let err = mock.send(&Request::new(Method::Get, "/a")).unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_request_builder() {
        let request = Request::new(Method::Get, "/interface/bonding")
            .query("name", "bond1")
            .json(serde_json::json!({"mtu": "1500"}));
        assert_eq!(request.query, vec![("name".to_string(), "bond1".to_string())]);
        assert!(request.body.is_some());
    }

    #[test]
    fn test_response_into_result() {
        let ok = Response {
            status: 201,
            body: String::new(),
        };
        assert!(ok.into_result().is_ok());

        let err = Response {
            status: 400,
            body: r#"{"detail":"failure: bad"}"#.to_string(),
        }
        .into_result()
        .unwrap_err();
        assert!(err.to_string().contains("failure: bad"));
    }
}
