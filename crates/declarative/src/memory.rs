//! In-memory device
//!
//! A [`RemoteClient`] backed by plain tables, for tests and offline runs.
//! It behaves like a small RouterOS: records get a `.id` on add, computed
//! fields can be filled in, writes can be refused by rule, and every call
//! is logged so callers can count remote round trips.

use crate::client::{CancelToken, Fields, Filter, RemoteClient, RemoteRecord, Session};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Kind of remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    List,
    Add,
    Set,
    Remove,
    PatchList,
}

impl Method {
    /// Whether the call writes to the device
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::List)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::List => "print",
            Self::Add => "add",
            Self::Set => "set",
            Self::Remove => "remove",
            Self::PatchList => "patch",
        };
        write!(f, "{name}")
    }
}

/// One logged call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: Method,
    pub path: String,
    /// Wire keys written, empty for reads and removes
    pub keys: Vec<String>,
}

/// Refuses writes carrying `key` (optionally with a given value).
#[derive(Debug, Clone)]
struct RejectRule {
    path: String,
    key: String,
    value: Option<String>,
    message: String,
}

impl RejectRule {
    fn applies(&self, path: &str, fields: &Fields) -> bool {
        self.path == path
            && fields
                .get(&self.key)
                .is_some_and(|v| self.value.as_ref().is_none_or(|want| want == v))
    }
}

#[derive(Debug, Default)]
struct DeviceState {
    tables: BTreeMap<String, Vec<RemoteRecord>>,
    computed: BTreeMap<String, Fields>,
    rules: Vec<RejectRule>,
    calls: Vec<Call>,
    next_id: u64,
    transport_failures: usize,
    open_sessions: usize,
}

/// In-memory [`RemoteClient`].
#[derive(Debug, Default)]
pub struct MemoryDevice {
    state: Mutex<DeviceState>,
    incremental_lists: bool,
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let sessions add and remove list members in place.
    pub fn with_incremental_lists(mut self, enabled: bool) -> Self {
        self.incremental_lists = enabled;
        self
    }

    /// Fields the device fills in on add when not sent.
    pub fn with_computed(self, path: &str, fields: &[(&str, &str)]) -> Self {
        {
            let mut state = self.lock();
            let entry = state.computed.entry(path.to_string()).or_default();
            for (k, v) in fields {
                entry.insert((*k).to_string(), (*v).to_string());
            }
        }
        self
    }

    /// Refuse writes under `path` that carry `key`, or `key=value` when a
    /// value is given.
    pub fn reject(&self, path: &str, key: &str, value: Option<&str>, message: &str) {
        self.lock().rules.push(RejectRule {
            path: path.to_string(),
            key: key.to_string(),
            value: value.map(str::to_string),
            message: message.to_string(),
        });
    }

    /// Fail the next `count` calls with a transport error.
    pub fn fail_transport(&self, count: usize) {
        self.lock().transport_failures = count;
    }

    /// Seed a record directly, bypassing rules and the call log.
    pub fn insert(&self, path: &str, record: RemoteRecord) -> String {
        let mut state = self.lock();
        let id = state.assign_id();
        let mut record = record;
        record.insert(".id".to_string(), id.clone());
        state.tables.entry(path.to_string()).or_default().push(record);
        id
    }

    /// Current records under `path`
    pub fn records(&self, path: &str) -> Vec<RemoteRecord> {
        self.lock().tables.get(path).cloned().unwrap_or_default()
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Calls that modified the device
    pub fn write_count(&self) -> usize {
        self.lock().calls.iter().filter(|c| c.method.is_write()).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Sessions acquired and not yet dropped
    pub fn open_sessions(&self) -> usize {
        self.lock().open_sessions
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RemoteClient for MemoryDevice {
    fn acquire(&self, cancel: &CancelToken) -> Result<Box<dyn Session + '_>> {
        cancel.check()?;
        self.lock().open_sessions += 1;
        Ok(Box::new(MemorySession {
            device: self,
            cancel: cancel.clone(),
        }))
    }
}

impl DeviceState {
    fn assign_id(&mut self) -> String {
        self.next_id += 1;
        format!("*{:X}", self.next_id)
    }

    fn begin(&mut self, method: Method, path: &str, fields: Option<&Fields>) -> Result<()> {
        self.calls.push(Call {
            method,
            path: path.to_string(),
            keys: fields
                .map(|f| f.keys().cloned().collect())
                .unwrap_or_default(),
        });
        if self.transport_failures > 0 {
            self.transport_failures -= 1;
            return Err(Error::transport("connection reset by peer"));
        }
        Ok(())
    }

    fn check_rules(&self, path: &str, fields: &Fields) -> Result<()> {
        match self.rules.iter().find(|r| r.applies(path, fields)) {
            Some(rule) => Err(Error::RemoteRejected {
                path: path.to_string(),
                property: None,
                message: rule.message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn find_mut(&mut self, path: &str, filter: &Filter) -> Result<&mut RemoteRecord> {
        self.tables
            .get_mut(path)
            .and_then(|rows| rows.iter_mut().find(|r| filter.matches(r)))
            .ok_or_else(|| Error::NotFound {
                path: path.to_string(),
                identity: filter.value.clone(),
            })
    }
}

struct MemorySession<'a> {
    device: &'a MemoryDevice,
    cancel: CancelToken,
}

impl Drop for MemorySession<'_> {
    fn drop(&mut self) {
        let mut state = self.device.lock();
        state.open_sessions = state.open_sessions.saturating_sub(1);
    }
}

impl Session for MemorySession<'_> {
    fn list(&mut self, path: &str, filter: Option<&Filter>) -> Result<Vec<RemoteRecord>> {
        self.cancel.check()?;
        let mut state = self.device.lock();
        state.begin(Method::List, path, None)?;
        Ok(state
            .tables
            .get(path)
            .map(|rows| {
                rows.iter()
                    .filter(|r| filter.is_none_or(|f| f.matches(r)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn add(&mut self, path: &str, fields: &Fields) -> Result<String> {
        self.cancel.check()?;
        let mut state = self.device.lock();
        state.begin(Method::Add, path, Some(fields))?;
        state.check_rules(path, fields)?;

        if let Some(name) = fields.get("name") {
            let taken = state
                .tables
                .get(path)
                .is_some_and(|rows| rows.iter().any(|r| r.get("name") == Some(name)));
            if taken {
                return Err(Error::rejected(
                    path,
                    format!("failure: already have such name: {name}"),
                ));
            }
        }

        let id = state.assign_id();
        let mut record = state.computed.get(path).cloned().unwrap_or_default();
        record.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        record.insert(".id".to_string(), id.clone());
        state.tables.entry(path.to_string()).or_default().push(record);
        Ok(id)
    }

    fn set(&mut self, path: &str, filter: &Filter, fields: &Fields) -> Result<()> {
        self.cancel.check()?;
        let mut state = self.device.lock();
        state.begin(Method::Set, path, Some(fields))?;
        state.check_rules(path, fields)?;
        let record = state.find_mut(path, filter)?;
        record.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    fn remove(&mut self, path: &str, filter: &Filter) -> Result<()> {
        self.cancel.check()?;
        let mut state = self.device.lock();
        state.begin(Method::Remove, path, None)?;
        let rows = state.tables.get_mut(path);
        let position = rows
            .as_ref()
            .and_then(|rows| rows.iter().position(|r| filter.matches(r)));
        match (rows, position) {
            (Some(rows), Some(index)) => {
                rows.remove(index);
                Ok(())
            }
            _ => Err(Error::NotFound {
                path: path.to_string(),
                identity: filter.value.clone(),
            }),
        }
    }

    fn supports_list_patch(&self) -> bool {
        self.device.incremental_lists
    }

    fn patch_list(
        &mut self,
        path: &str,
        filter: &Filter,
        key: &str,
        added: &[String],
        removed: &[String],
    ) -> Result<()> {
        if !self.device.incremental_lists {
            return Err(Error::rejected(
                path,
                format!("incremental update of '{key}' is not supported"),
            ));
        }
        self.cancel.check()?;
        let mut state = self.device.lock();
        let mut fields = Fields::new();
        fields.insert(key.to_string(), added.join(","));
        state.begin(Method::PatchList, path, Some(&fields))?;
        state.check_rules(path, &fields)?;

        let record = state.find_mut(path, filter)?;
        let mut members: Vec<String> = record
            .get(key)
            .map(|raw| {
                raw.split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        members.retain(|m| !removed.contains(m));
        for item in added {
            if !members.contains(item) {
                members.push(item.clone());
            }
        }
        record.insert(key.to_string(), members.join(","));
        Ok(())
    }
}
