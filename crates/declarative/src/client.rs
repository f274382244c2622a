//! Remote client boundary
//!
//! The engine talks to the device through a [`RemoteClient`], which hands
//! out one [`Session`] per logical operation. Sessions are released when
//! dropped, so every exit path (including `?`) gives the connection back.
//!
//! All field values cross this boundary as strings. Typing is the engine's
//! job.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Flat record as returned by the device, keyed by wire name
pub type RemoteRecord = BTreeMap<String, String>;

/// Write payload, keyed by wire name
pub type Fields = BTreeMap<String, String>;

/// Addresses records by one wire key, usually the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub key: String,
    pub value: String,
}

impl Filter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether a record matches this filter.
    pub fn matches(&self, record: &RemoteRecord) -> bool {
        record.get(&self.key) == Some(&self.value)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Cooperative cancellation shared between a caller and in-flight operations.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`Error::Cancelled`] once cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A connection to the device held for one logical operation.
///
/// Errors use the engine taxonomy: a write the device refuses is
/// [`Error::RemoteRejected`], a filter that matches nothing on `set` or
/// `remove` is [`Error::NotFound`], connectivity problems are
/// [`Error::Transport`].
pub trait Session {
    /// List records under `path`, optionally narrowed by a filter.
    fn list(&mut self, path: &str, filter: Option<&Filter>) -> Result<Vec<RemoteRecord>>;

    /// Add a record and return the device-assigned record id.
    fn add(&mut self, path: &str, fields: &Fields) -> Result<String>;

    /// Set fields on the record matching `filter`.
    fn set(&mut self, path: &str, filter: &Filter, fields: &Fields) -> Result<()>;

    /// Remove the record matching `filter`.
    fn remove(&mut self, path: &str, filter: &Filter) -> Result<()>;

    /// Whether the device can add and remove individual list members.
    fn supports_list_patch(&self) -> bool {
        false
    }

    /// Add and remove members of a list-valued field in place.
    fn patch_list(
        &mut self,
        path: &str,
        _filter: &Filter,
        key: &str,
        _added: &[String],
        _removed: &[String],
    ) -> Result<()> {
        Err(Error::rejected(
            path,
            format!("incremental update of '{key}' is not supported"),
        ))
    }
}

/// Source of device sessions. Shared across concurrent operations.
pub trait RemoteClient: Send + Sync {
    /// Acquire a session for one logical operation.
    ///
    /// The token is checked by the session before each call.
    fn acquire(&self, cancel: &CancelToken) -> Result<Box<dyn Session + '_>>;
}
