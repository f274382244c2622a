//! Diff computation between observed and desired state

use crate::lists::{self, ListOrder};
use crate::resource::ResourceDescriptor;
use crate::types::{Mutability, State, Value, ValueType};
use serde::{Deserialize, Serialize};

/// One property whose desired value differs from what the device has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyChange {
    /// Property name
    pub name: String,
    /// Last observed value, `None` when absent
    pub old: Option<Value>,
    /// Desired value
    pub new: Value,
    /// Declared type
    pub value_type: ValueType,
    /// Mutability class
    pub mutability: Mutability,
}

impl PropertyChange {
    pub fn is_list(&self) -> bool {
        self.value_type.is_list()
    }

    pub fn is_force_new(&self) -> bool {
        self.mutability == Mutability::WriteOnceForceReplace
    }
}

/// Changes needed to take one instance from observed to desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    /// Changed properties in descriptor order
    pub changes: Vec<PropertyChange>,
}

impl Diff {
    /// Compare desired against observed state.
    ///
    /// Only properties present in `desired` are considered; anything the
    /// caller leaves out is not managed. Read-only properties never produce
    /// a change. Lists are compared under their declared semantics, so a
    /// reordered set is not a change but a reordered ordered list is.
    pub fn compute(descriptor: &ResourceDescriptor, observed: &State, desired: &State) -> Self {
        let changes = descriptor
            .properties()
            .iter()
            .filter(|prop| prop.is_writable())
            .filter_map(|prop| {
                let new = desired.get(prop.name())?;
                let old = observed.get(prop.name());
                if values_equal(prop.value_type(), old, new) {
                    return None;
                }
                Some(PropertyChange {
                    name: prop.name().to_string(),
                    old: old.cloned(),
                    new: new.clone(),
                    value_type: prop.value_type(),
                    mutability: prop.mutability(),
                })
            })
            .collect();

        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Scalar changes, sent together in one set command
    pub fn scalar_changes(&self) -> impl Iterator<Item = &PropertyChange> {
        self.changes.iter().filter(|c| !c.is_list())
    }

    /// List changes, applied per property after the scalars
    pub fn list_changes(&self) -> impl Iterator<Item = &PropertyChange> {
        self.changes.iter().filter(|c| c.is_list())
    }

    /// Names of changed write-once properties
    pub fn force_new_properties(&self) -> Vec<String> {
        self.changes
            .iter()
            .filter(|c| c.is_force_new())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Whether applying this diff needs a destroy and recreate
    pub fn requires_replace(&self) -> bool {
        self.changes.iter().any(PropertyChange::is_force_new)
    }
}

fn values_equal(value_type: ValueType, old: Option<&Value>, new: &Value) -> bool {
    match (ListOrder::of(value_type), old) {
        (_, None) => false,
        (Some(order), Some(Value::List(old))) => match new {
            Value::List(new) => lists::equivalent(order, old, new),
            _ => false,
        },
        (_, Some(old)) => old == new,
    }
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// Instances to create
    pub additions: usize,
    /// Instances to delete
    pub removals: usize,
    /// Instances to update in place
    pub modifications: usize,
    /// Instances to destroy and recreate
    pub replacements: usize,
}

impl DiffSummary {
    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications + self.replacements
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}
