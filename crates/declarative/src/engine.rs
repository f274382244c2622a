//! CRUD engine
//!
//! Drives create, read, update, delete and import for any registered
//! resource kind. There is no per-kind logic here: everything the engine
//! knows about a kind comes from its [`ResourceDescriptor`].
//!
//! Each operation acquires one session from the [`RemoteClient`], does its
//! work, and releases the session on return. The engine holds no state
//! between calls and is safe to share across threads.

use crate::client::{CancelToken, Fields, Filter, RemoteClient, Session};
use crate::diff::{Diff, PropertyChange};
use crate::error::{Error, Result, ValidationError};
use crate::lists::{self, ListChange, ListOrder};
use crate::mapper;
use crate::property::encode_value;
use crate::resource::{Registry, ResourceDescriptor};
use crate::types::{DeleteOutcome, Observed, State, Value};
use std::sync::Arc;

/// Schema-driven CRUD over a remote device.
#[derive(Clone)]
pub struct Engine {
    registry: Arc<Registry>,
    client: Arc<dyn RemoteClient>,
}

impl Engine {
    pub fn new(registry: Arc<Registry>, client: Arc<dyn RemoteClient>) -> Self {
        Self { registry, client }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Look up the descriptor for a kind.
    pub fn descriptor(&self, kind: &str) -> Result<Arc<ResourceDescriptor>> {
        self.registry.get(kind)
    }

    /// Create an instance.
    ///
    /// Sends one add carrying only writable, non-default properties, then
    /// reads the instance back so the result includes whatever the device
    /// filled in. A refused add leaves nothing behind.
    pub fn create(&self, kind: &str, desired: &State, cancel: &CancelToken) -> Result<Observed> {
        let descriptor = self.descriptor(kind)?;
        descriptor.validate_desired(desired, true)?;

        let identity_prop = descriptor.identity();
        let natural_identity = if descriptor.identity_is_assigned() {
            None
        } else {
            let value = desired.get(identity_prop.name()).ok_or_else(|| Error::Validation {
                kind: kind.to_string(),
                errors: vec![ValidationError::new(
                    identity_prop.name(),
                    "identity property missing",
                )],
            })?;
            Some(encode_value(value))
        };

        let mut fields = mapper::to_remote(desired, &descriptor, true);
        if let Some(identity) = &natural_identity {
            fields.insert(identity_prop.wire_name().to_string(), identity.clone());
        }

        let mut session = self.client.acquire(cancel)?;
        cancel.check()?;
        log::debug!(
            "add {} [{}]",
            descriptor.path(),
            fields.keys().cloned().collect::<Vec<_>>().join(", ")
        );
        let record_id = session.add(descriptor.path(), &fields)?;

        let identity = natural_identity.unwrap_or(record_id);
        let observed = read_with(&mut *session, &descriptor, &identity, cancel)?
            .ok_or_else(|| not_found(&descriptor, &identity))?;

        log::info!("Created {} '{}'", kind, identity);
        Ok(observed)
    }

    /// Read an instance by identity.
    ///
    /// An absent instance is `Ok(None)`, not an error, so callers can treat
    /// it as drift.
    pub fn read(&self, kind: &str, identity: &str, cancel: &CancelToken) -> Result<Option<Observed>> {
        let descriptor = self.descriptor(kind)?;
        let mut session = self.client.acquire(cancel)?;
        read_with(&mut *session, &descriptor, identity, cancel)
    }

    /// Compute the diff an update would apply.
    pub fn diff(&self, kind: &str, observed: &State, desired: &State) -> Result<Diff> {
        let descriptor = self.descriptor(kind)?;
        Ok(Diff::compute(&descriptor, observed, desired))
    }

    /// Update an instance in place.
    ///
    /// Changed scalars go out in one set, then each changed list property is
    /// applied on its own. The first refusal stops the update; the device may
    /// then be partially updated and the next read shows how far it got.
    /// Nothing is rolled back.
    ///
    /// An empty diff makes no remote calls at all. A change to a write-once
    /// property fails with [`Error::ConflictForceNew`] before any call.
    pub fn update(
        &self,
        kind: &str,
        identity: &str,
        observed: &State,
        desired: &State,
        cancel: &CancelToken,
    ) -> Result<Observed> {
        let descriptor = self.descriptor(kind)?;
        descriptor.validate_desired(desired, false)?;

        let diff = Diff::compute(&descriptor, observed, desired);
        if diff.is_empty() {
            log::debug!("{} '{}' already converged", kind, identity);
            return Ok(Observed {
                identity: identity.to_string(),
                state: observed.clone(),
                decode_errors: Vec::new(),
            });
        }

        let force_new = diff.force_new_properties();
        if !force_new.is_empty() {
            return Err(Error::ConflictForceNew {
                kind: kind.to_string(),
                identity: identity.to_string(),
                properties: force_new,
            });
        }

        let mut session = self.client.acquire(cancel)?;
        let filter = identity_filter(&descriptor, identity);

        let scalars = scalar_fields(&descriptor, diff.scalar_changes());
        if !scalars.is_empty() {
            cancel.check()?;
            log::debug!(
                "set {} {} [{}]",
                descriptor.path(),
                filter,
                scalars.keys().cloned().collect::<Vec<_>>().join(", ")
            );
            session.set(descriptor.path(), &filter, &scalars)?;
        }

        for change in diff.list_changes() {
            apply_list_change(&mut *session, &descriptor, &filter, change, cancel)
                .map_err(|e| e.for_property(&change.name))?;
        }

        let observed = read_with(&mut *session, &descriptor, identity, cancel)?
            .ok_or_else(|| not_found(&descriptor, identity))?;

        log::info!("Updated {} '{}' ({} properties)", kind, identity, diff.len());
        Ok(observed)
    }

    /// Delete an instance. Deleting an absent instance succeeds.
    pub fn delete(&self, kind: &str, identity: &str, cancel: &CancelToken) -> Result<DeleteOutcome> {
        let descriptor = self.descriptor(kind)?;
        let mut session = self.client.acquire(cancel)?;
        let filter = identity_filter(&descriptor, identity);

        cancel.check()?;
        log::debug!("remove {} {}", descriptor.path(), filter);
        match session.remove(descriptor.path(), &filter) {
            Ok(()) => {
                log::info!("Deleted {} '{}'", kind, identity);
                Ok(DeleteOutcome::Removed)
            }
            Err(e) if e.is_not_found() => {
                log::debug!("{} '{}' already absent", kind, identity);
                Ok(DeleteOutcome::AlreadyAbsent)
            }
            Err(e) => Err(e),
        }
    }

    /// Adopt an existing instance.
    ///
    /// The result of a single read is the whole initial state; nothing else
    /// is consulted.
    pub fn import(&self, kind: &str, identity: &str, cancel: &CancelToken) -> Result<Observed> {
        let descriptor = self.descriptor(kind)?;
        self.read(kind, identity, cancel)?
            .ok_or_else(|| not_found(&descriptor, identity))
    }
}

fn identity_filter(descriptor: &ResourceDescriptor, identity: &str) -> Filter {
    Filter::new(descriptor.identity().wire_name(), identity)
}

fn not_found(descriptor: &ResourceDescriptor, identity: &str) -> Error {
    Error::NotFound {
        path: descriptor.path().to_string(),
        identity: identity.to_string(),
    }
}

fn read_with(
    session: &mut dyn Session,
    descriptor: &ResourceDescriptor,
    identity: &str,
    cancel: &CancelToken,
) -> Result<Option<Observed>> {
    let filter = identity_filter(descriptor, identity);
    cancel.check()?;
    log::debug!("print {} {}", descriptor.path(), filter);
    let records = session.list(descriptor.path(), Some(&filter))?;

    let Some(record) = records.first() else {
        return Ok(None);
    };
    if records.len() > 1 {
        log::warn!(
            "{} records at {} match {}; using the first",
            records.len(),
            descriptor.path(),
            filter
        );
    }

    let (state, mut decode_errors) = mapper::from_remote(record, descriptor);
    if let Some(pos) = decode_errors
        .iter()
        .position(|e| e.property == descriptor.identity().name())
    {
        return Err(Error::Decode(decode_errors.swap_remove(pos)));
    }
    Ok(Some(Observed {
        identity: identity.to_string(),
        state,
        decode_errors,
    }))
}

fn scalar_fields<'a>(
    descriptor: &ResourceDescriptor,
    changes: impl Iterator<Item = &'a PropertyChange>,
) -> Fields {
    changes
        .filter_map(|change| {
            let prop = descriptor.property(&change.name)?;
            Some((prop.wire_name().to_string(), prop.encode(&change.new)?))
        })
        .collect()
}

fn apply_list_change(
    session: &mut dyn Session,
    descriptor: &ResourceDescriptor,
    filter: &Filter,
    change: &PropertyChange,
    cancel: &CancelToken,
) -> Result<()> {
    let Some(prop) = descriptor.property(&change.name) else {
        return Ok(());
    };
    let order = ListOrder::of(prop.value_type()).unwrap_or(ListOrder::Ordered);
    let observed = change
        .old
        .as_ref()
        .and_then(Value::as_list)
        .unwrap_or_default();
    let desired = change.new.as_list().unwrap_or_default();

    match lists::reconcile(order, observed, desired, session.supports_list_patch()) {
        ListChange::Unchanged => Ok(()),
        ListChange::Replace(items) => {
            let mut fields = Fields::new();
            fields.insert(prop.wire_name().to_string(), items.join(","));
            cancel.check()?;
            log::debug!("set {} {} [{}]", descriptor.path(), filter, prop.wire_name());
            session.set(descriptor.path(), filter, &fields)
        }
        ListChange::Patch { added, removed } => {
            cancel.check()?;
            log::debug!(
                "patch {} {} {} +{} -{}",
                descriptor.path(),
                filter,
                prop.wire_name(),
                added.len(),
                removed.len()
            );
            session.patch_list(descriptor.path(), filter, prop.wire_name(), &added, &removed)
        }
    }
}
