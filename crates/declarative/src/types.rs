//! Core types for schema-driven reconciliation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A typed property value.
///
/// List elements are kept as strings; element typing is the job of the
/// property's validator, matching how the device reports them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<String>),
}

impl Value {
    /// Build a list value from anything string-like.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Name of the variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Property name to typed value, scoped to one resource instance.
///
/// A property missing from the map is absent: neither set by the caller
/// nor reported by the device.
pub type State = BTreeMap<String, Value>;

/// Declared type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    Bool,
    Int,
    String,
    /// Priority-ranked list; element order is significant
    OrderedList,
    /// Membership list; element order is not significant
    UnorderedList,
}

impl ValueType {
    /// Check that a value has the right shape for this type.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Bool, Value::Bool(_))
                | (Self::Int, Value::Int(_))
                | (Self::String, Value::String(_))
                | (Self::OrderedList | Self::UnorderedList, Value::List(_))
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::OrderedList | Self::UnorderedList)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::String => "string",
            Self::OrderedList => "ordered list",
            Self::UnorderedList => "set",
        };
        write!(f, "{name}")
    }
}

/// Mutability class of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutability {
    /// Freely writable
    ReadWrite,
    /// Computed by the device; never sent upstream
    ReadOnly,
    /// Set at creation; changing it means destroy and recreate
    WriteOnceForceReplace,
}

impl Mutability {
    /// Whether the property may appear in a write payload.
    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::ReadOnly)
    }
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReadWrite => "read-write",
            Self::ReadOnly => "read-only",
            Self::WriteOnceForceReplace => "force-new",
        };
        write!(f, "{name}")
    }
}

/// Live state of one instance, as last read from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    /// Value addressing the instance for read, update and delete
    pub identity: String,
    /// Decoded properties
    pub state: State,
    /// Properties the device reported but that could not be decoded
    pub decode_errors: Vec<crate::error::DecodeError>,
}

/// Outcome of an idempotent delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The record existed and was removed
    Removed,
    /// Nothing to remove
    AlreadyAbsent,
}

/// Result of applying one planned change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Instance was created
    Created { identity: String, state: State },
    /// Instance was updated in place
    Modified { identity: String, state: State },
    /// Instance was destroyed and recreated
    Replaced { identity: String, state: State },
    /// Instance was removed (or already gone)
    Removed,
    /// Apply failed
    Failed { error: String },
    /// Apply was skipped
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Created { .. } | Self::Modified { .. } | Self::Replaced { .. } | Self::Removed
        )
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub modified: usize,
    pub replaced: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.modified + self.replaced + self.removed
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of instances processed
    pub fn total(&self) -> usize {
        self.total_changes() + self.skipped + self.failed + self.no_change
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created { .. } => self.created += 1,
            ApplyResult::Modified { .. } => self.modified += 1,
            ApplyResult::Replaced { .. } => self.replaced += 1,
            ApplyResult::Removed => self.removed += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of instances reconciled concurrently
    pub jobs: usize,
    /// Verbose output
    pub verbose: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            verbose: false,
        }
    }
}
