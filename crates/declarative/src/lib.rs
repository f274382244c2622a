//! # Declarative
//!
//! Schema-driven reconciliation of device configuration.
//!
//! This crate decides which remote calls bring a device from its observed
//! configuration to a desired one, for any resource kind described by a
//! property table. No kind gets special code.
//!
//! ## Core Concepts
//!
//! - **PropertyDescriptor**: type, mutability, validator and default of one property
//! - **ResourceDescriptor**: the ordered property table of one kind, plus its
//!   device path and identity property
//! - **Mapper**: typed state to device fields and back, best effort on decode
//! - **Lists**: ordered lists are replaced whole, unordered lists compared as sets
//! - **Engine**: create, read, update, delete and import over a [`RemoteClient`]
//! - **ExecutionPlan** / **execute**: reconcile many instances at once
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{
//!     CancelToken, Engine, MemoryDevice, PropertyDescriptor, Registry,
//!     ResourceDescriptor, State, Value,
//! };
//! use std::sync::Arc;
//!
//! let bonding = ResourceDescriptor::builder("interface_bonding", "/interface/bonding")
//!     .identity("name")
//!     .property(PropertyDescriptor::string("name").force_new().required())
//!     .property(PropertyDescriptor::unordered_list("slaves").required())
//!     .build()?;
//!
//! let mut registry = Registry::new();
//! registry.register(bonding)?;
//!
//! let engine = Engine::new(Arc::new(registry), Arc::new(MemoryDevice::new()));
//! let cancel = CancelToken::new();
//!
//! let mut desired = State::new();
//! desired.insert("name".into(), Value::from("bond1"));
//! desired.insert("slaves".into(), Value::list(["ether3", "ether4"]));
//!
//! let observed = engine.create("interface_bonding", &desired, &cancel)?;
//! assert_eq!(observed.identity, "bond1");
//! ```
//!
//! ## Provider Traits
//!
//! - [`RemoteClient`] / [`Session`]: the device connection
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on a
//! particular transport or terminal UI.

pub mod client;
pub mod context;
pub mod diff;
pub mod engine;
pub mod error;
pub mod executor;
pub mod lists;
pub mod mapper;
pub mod memory;
pub mod planner;
pub mod property;
pub mod resource;
pub mod types;
pub mod validate;

// Re-export main types at crate root
pub use client::{CancelToken, Fields, Filter, RemoteClient, RemoteRecord, Session};
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diff::{Diff, DiffSummary, PropertyChange};
pub use engine::Engine;
pub use error::{DecodeError, Error, ErrorCategory, Result, ValidationError};
pub use executor::{ChangeOutcome, ExecuteReport, execute};
pub use lists::{ListChange, ListOrder};
pub use memory::MemoryDevice;
pub use planner::{
    Action, DesiredInstance, ExecutionPlan, PlannedChange, TrackedInstance, matches_target,
};
pub use property::PropertyDescriptor;
pub use resource::{Registry, ResourceDescriptor};
pub use types::{
    ApplyResult, DeleteOutcome, ExecuteOptions, ExecuteSummary, Mutability, Observed, State,
    Value, ValueType,
};
pub use validate::Validator;
