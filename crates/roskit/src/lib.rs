//! # roskit
//!
//! Pure Rust client for the RouterOS REST API.
//!
//! This crate provides:
//! - A blocking HTTP(S) transport with Basic authentication
//! - Retry with exponential backoff for idempotent requests
//! - Error categories mapped from RouterOS status codes and messages
//! - A [`declarative::RemoteClient`] implementation, so the reconciliation
//!   engine can drive a real router
//!
//! ## Example
//!
//! ```no_run
//! use roskit::{ConnectionConfig, RestClient};
//!
//! let client = RestClient::connect(ConnectionConfig::new(
//!     "https://192.168.88.1",
//!     "admin",
//!     "secret",
//! ));
//!
//! let name = client.identity().expect("router unreachable");
//! println!("Connected to {name}");
//! ```
//!
//! ## Menu Commands
//!
//! | Command  | Method | URL                  |
//! |----------|--------|----------------------|
//! | `print`  | GET    | `/rest/<menu>`       |
//! | `add`    | PUT    | `/rest/<menu>`       |
//! | `set`    | PATCH  | `/rest/<menu>/<id>`  |
//! | `remove` | DELETE | `/rest/<menu>/<id>`  |
//!
//! `set` and `remove` address records by their `.id`, so a session looks
//! the id up first when filtering by any other key.

pub mod backend;
pub mod error;
pub mod retry;
pub mod types;

pub use backend::MockTransport;
pub use error::{Error, ErrorCategory, Result};
pub use types::{ConnectionConfig, Method, RetryConfig};

use backend::http::HttpTransport;
use backend::{Request, Response, Transport};
use declarative::{CancelToken, Fields, Filter, RemoteClient, RemoteRecord, Session};
use retry::{LogCallback, with_retry};
use serde_json::Value as Json;

/// Wire key of the record id on every menu.
pub const ID_KEY: &str = ".id";

/// High-level client for one router.
///
/// Shared across threads; every engine operation gets its own
/// [`RestSession`] on top of it.
pub struct RestClient {
    transport: Box<dyn Transport>,
    retry: RetryConfig,
}

impl RestClient {
    /// Create a client that talks HTTP(S) to the configured router.
    #[must_use]
    pub fn connect(config: ConnectionConfig) -> Self {
        Self::with_transport(HttpTransport::new(config))
    }

    /// Create a client with a custom transport (for testing).
    #[must_use]
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            retry: RetryConfig::default(),
        }
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Read the router's system identity, as a connectivity check.
    pub fn identity(&self) -> Result<String> {
        let response = self.send(&Request::new(Method::Get, "/system/identity"), None)?;
        let body: Json = serde_json::from_str(&response.body)?;
        body.get("name")
            .and_then(Json::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidResponse("identity has no name".to_string()))
    }

    /// Send a request, retrying idempotent ones on transient failures.
    ///
    /// Non-success statuses come back as errors.
    fn send(&self, request: &Request, cancel: Option<&CancelToken>) -> Result<Response> {
        let attempt = || {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(Error::Cancelled);
            }
            log::debug!("{} {}", request.method, request.path);
            self.transport.send(request)?.into_result()
        };

        if request.method.is_idempotent() {
            with_retry(&self.retry, Some(&LogCallback), attempt)
        } else {
            attempt()
        }
    }
}

impl RemoteClient for RestClient {
    fn acquire(&self, cancel: &CancelToken) -> declarative::Result<Box<dyn Session + '_>> {
        cancel.check()?;
        Ok(Box::new(RestSession {
            client: self,
            cancel: cancel.clone(),
        }))
    }
}

/// One logical operation against the router.
///
/// The REST API is stateless, so dropping a session releases nothing
/// beyond the borrow of its client.
pub struct RestSession<'a> {
    client: &'a RestClient,
    cancel: CancelToken,
}

impl RestSession<'_> {
    fn send(&self, request: &Request, identity: &str) -> declarative::Result<Response> {
        self.client
            .send(request, Some(&self.cancel))
            .map_err(|e| e.into_remote(&request.path, identity))
    }

    /// Resolve a filter to the `.id` that `set` and `remove` need.
    fn resolve_id(&mut self, path: &str, filter: &Filter) -> declarative::Result<String> {
        if filter.key == ID_KEY {
            return Ok(filter.value.clone());
        }

        let records = self.list(path, Some(filter))?;
        records
            .into_iter()
            .find_map(|mut record| record.remove(ID_KEY))
            .ok_or_else(|| declarative::Error::NotFound {
                path: path.to_string(),
                identity: filter.value.clone(),
            })
    }
}

impl Session for RestSession<'_> {
    fn list(&mut self, path: &str, filter: Option<&Filter>) -> declarative::Result<Vec<RemoteRecord>> {
        if let Some(filter) = filter
            && filter.key == ID_KEY
        {
            let request = Request::new(Method::Get, format!("{path}/{}", filter.value));
            return match self.send(&request, &filter.value) {
                Ok(response) => Ok(vec![parse_record(&response.body, path)?]),
                Err(e) if e.is_not_found() => Ok(Vec::new()),
                Err(e) => Err(e),
            };
        }

        let mut request = Request::new(Method::Get, path);
        if let Some(filter) = filter {
            request = request.query(&filter.key, &filter.value);
        }
        let identity = filter.map(|f| f.value.as_str()).unwrap_or_default();
        let response = self.send(&request, identity)?;
        parse_records(&response.body, path)
    }

    fn add(&mut self, path: &str, fields: &Fields) -> declarative::Result<String> {
        let request = Request::new(Method::Put, path).json(fields_to_json(fields));
        let response = self.send(&request, "")?;
        let mut record = parse_record(&response.body, path)?;
        record.remove(ID_KEY).ok_or_else(|| {
            Error::InvalidResponse(format!("add on {path} returned no {ID_KEY}")).into_remote(path, "")
        })
    }

    fn set(&mut self, path: &str, filter: &Filter, fields: &Fields) -> declarative::Result<()> {
        let id = self.resolve_id(path, filter)?;
        let request = Request::new(Method::Patch, format!("{path}/{id}")).json(fields_to_json(fields));
        self.send(&request, &filter.value)?;
        Ok(())
    }

    fn remove(&mut self, path: &str, filter: &Filter) -> declarative::Result<()> {
        let id = self.resolve_id(path, filter)?;
        let request = Request::new(Method::Delete, format!("{path}/{id}"));
        self.send(&request, &filter.value)?;
        Ok(())
    }
}

fn fields_to_json(fields: &Fields) -> Json {
    Json::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), Json::String(v.clone())))
            .collect(),
    )
}

/// Flatten a JSON object into string fields. Nulls are dropped.
fn record_from_json(value: Json) -> Option<RemoteRecord> {
    let Json::Object(map) = value else {
        return None;
    };
    Some(
        map.into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Json::Null => return None,
                    Json::String(s) => s,
                    Json::Bool(b) => b.to_string(),
                    other => other.to_string(),
                };
                Some((key, text))
            })
            .collect(),
    )
}

fn parse_record(body: &str, path: &str) -> declarative::Result<RemoteRecord> {
    serde_json::from_str::<Json>(body)
        .map_err(Error::from)
        .and_then(|value| {
            record_from_json(value)
                .ok_or_else(|| Error::InvalidResponse("expected a JSON object".to_string()))
        })
        .map_err(|e| e.into_remote(path, ""))
}

fn parse_records(body: &str, path: &str) -> declarative::Result<Vec<RemoteRecord>> {
    let value: Json = serde_json::from_str(body).map_err(|e| Error::from(e).into_remote(path, ""))?;
    let Json::Array(items) = value else {
        return Err(Error::InvalidResponse("expected a JSON array".to_string()).into_remote(path, ""));
    };

    items
        .into_iter()
        .map(|item| {
            record_from_json(item).ok_or_else(|| {
                Error::InvalidResponse("expected JSON objects".to_string()).into_remote(path, "")
            })
        })
        .collect()
}
