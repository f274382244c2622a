//! Resource descriptors and the kind registry
//!
//! A [`ResourceDescriptor`] is the ordered property table for one resource
//! kind, plus its device collection path and identity property. Descriptors
//! are built once at start, then shared read-only through a [`Registry`].
//!
//! # Example
//!
//! ```ignore
//! use declarative::{PropertyDescriptor, Registry, ResourceDescriptor};
//!
//! let bonding = ResourceDescriptor::builder("interface_bonding", "/interface/bonding")
//!     .identity("name")
//!     .property(PropertyDescriptor::string("name").force_new().required())
//!     .property(PropertyDescriptor::unordered_list("slaves").required())
//!     .property(PropertyDescriptor::int("mtu").default_value(1500))
//!     .property(PropertyDescriptor::bool("running").read_only())
//!     .build()?;
//!
//! let mut registry = Registry::new();
//! registry.register(bonding)?;
//! ```

use crate::error::{Error, Result, ValidationError};
use crate::property::PropertyDescriptor;
use crate::types::{Mutability, State};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Property table for one resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    kind: String,
    path: String,
    identity: usize,
    properties: Vec<PropertyDescriptor>,
}

impl ResourceDescriptor {
    /// Start building a descriptor for `kind` stored under `path`.
    pub fn builder(kind: impl Into<String>, path: impl Into<String>) -> ResourceDescriptorBuilder {
        ResourceDescriptorBuilder {
            kind: kind.into(),
            path: path.into(),
            identity: None,
            properties: Vec::new(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Device collection path, e.g. `/interface/bonding`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Properties in declaration order
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Look up a property by the key the device uses for it.
    pub fn property_by_wire(&self, wire_name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.wire_name() == wire_name)
    }

    /// The identity property. Guaranteed to exist by [`ResourceDescriptorBuilder::build`].
    pub fn identity(&self) -> &PropertyDescriptor {
        &self.properties[self.identity]
    }

    /// Whether the device assigns the identity (a read-only identity property).
    pub fn identity_is_assigned(&self) -> bool {
        !self.identity().is_writable()
    }

    /// Validate a desired state against this descriptor.
    ///
    /// Collects every failure rather than stopping at the first. With
    /// `creating` set, required properties must also be present.
    pub fn validate_desired(&self, desired: &State, creating: bool) -> Result<()> {
        let mut errors = Vec::new();

        for (name, value) in desired {
            match self.property(name) {
                None => errors.push(ValidationError::new(name, "unknown property")),
                Some(prop) if !prop.is_writable() => {
                    errors.push(ValidationError::new(name, "read-only property cannot be set"))
                }
                Some(prop) => {
                    if let Err(e) = prop.validate(value) {
                        errors.push(e);
                    }
                }
            }
        }

        if creating {
            for prop in self.properties.iter().filter(|p| p.is_required()) {
                if !desired.contains_key(prop.name()) {
                    errors.push(ValidationError::new(prop.name(), "required property missing"));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation {
                kind: self.kind.clone(),
                errors,
            })
        }
    }
}

/// Builder for [`ResourceDescriptor`].
#[derive(Debug)]
pub struct ResourceDescriptorBuilder {
    kind: String,
    path: String,
    identity: Option<String>,
    properties: Vec<PropertyDescriptor>,
}

impl ResourceDescriptorBuilder {
    /// Name the identity property.
    pub fn identity(mut self, name: impl Into<String>) -> Self {
        self.identity = Some(name.into());
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn properties(mut self, properties: impl IntoIterator<Item = PropertyDescriptor>) -> Self {
        self.properties.extend(properties);
        self
    }

    /// Check the table and freeze it.
    ///
    /// Fails when the identity is missing, unknown or writable in place,
    /// when a property name or wire name repeats, or when a default does not
    /// fit its property.
    pub fn build(self) -> Result<ResourceDescriptor> {
        let schema = |message: String| Error::Schema {
            kind: self.kind.clone(),
            message,
        };

        let identity = self
            .identity
            .clone()
            .ok_or_else(|| schema("no identity property".to_string()))?;

        let mut names = HashSet::new();
        let mut wire_names = HashSet::new();
        for prop in &self.properties {
            if !names.insert(prop.name()) {
                return Err(schema(format!("duplicate property '{}'", prop.name())));
            }
            if !wire_names.insert(prop.wire_name()) {
                return Err(schema(format!("duplicate wire name '{}'", prop.wire_name())));
            }
            if let Some(default) = prop.default()
                && !prop.value_type().accepts(default)
            {
                return Err(schema(format!(
                    "default for '{}' is not a {}",
                    prop.name(),
                    prop.value_type()
                )));
            }
        }

        let identity = self
            .properties
            .iter()
            .position(|p| p.name() == identity)
            .ok_or_else(|| schema(format!("identity property '{identity}' is not declared")))?;
        if self.properties[identity].mutability() == Mutability::ReadWrite {
            return Err(schema(format!(
                "identity property '{}' must be read-only or force-new",
                self.properties[identity].name()
            )));
        }

        Ok(ResourceDescriptor {
            kind: self.kind,
            path: self.path,
            identity,
            properties: self.properties,
        })
    }
}

/// Read-only lookup of descriptors by kind name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    kinds: BTreeMap<String, Arc<ResourceDescriptor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor. Kind names must be unique.
    pub fn register(&mut self, descriptor: ResourceDescriptor) -> Result<()> {
        if self.kinds.contains_key(descriptor.kind()) {
            return Err(Error::Schema {
                kind: descriptor.kind().to_string(),
                message: "kind registered twice".to_string(),
            });
        }
        self.kinds
            .insert(descriptor.kind().to_string(), Arc::new(descriptor));
        Ok(())
    }

    /// Look up a kind, failing with [`Error::UnknownKind`].
    pub fn get(&self, kind: &str) -> Result<Arc<ResourceDescriptor>> {
        self.kinds
            .get(kind)
            .cloned()
            .ok_or_else(|| Error::UnknownKind(kind.to_string()))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Registered kind names, sorted
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
