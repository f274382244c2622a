//! Resource kinds managed by roscfg
//!
//! Every kind is a static property table handed to the declarative engine:
//! - `interface_ethernet` - physical ports
//! - `interface_bonding` - link aggregation over a set of slaves
//! - `interface_wireless` - legacy wireless interfaces
//! - `interface_wireless_security_profiles` - WPA/WEP/EAP profiles
//!
//! The registry is built once at start and shared read-only.

pub mod bonding;
pub mod common;
pub mod ethernet;
pub mod security_profiles;
pub mod wireless;

use anyhow::{Context, Result};
use declarative::Registry;

/// Build the registry of every known kind.
pub fn registry() -> Result<Registry> {
    let mut registry = Registry::new();
    for descriptor in [
        ethernet::descriptor(),
        bonding::descriptor(),
        wireless::descriptor(),
        security_profiles::descriptor(),
    ] {
        registry
            .register(descriptor.context("Invalid built-in resource kind")?)
            .context("Failed to register resource kind")?;
    }
    Ok(registry)
}
