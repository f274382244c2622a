//! Single-instance commands
//!
//! - `import` - Track an instance that already exists on the device
//! - `show` - Print the live state of one instance
//! - `destroy` - Delete one instance and stop tracking it

use anyhow::{Context as AnyhowContext, Result, bail};
use colored::Colorize;
use ::declarative::{ConfirmCallback, DeleteOutcome, Observed, ResourceDescriptor};

use super::Workspace;
use crate::Context;
use crate::engine::DialoguerConfirm;
use crate::ui;

// ============================================================================
// Import
// ============================================================================

pub fn import(ctx: &Context, kind: &str, identity: &str, key: Option<&str>) -> Result<()> {
    let mut workspace = Workspace::open(ctx)?;
    let key = key.unwrap_or(identity);

    let observed = import_into(&mut workspace, kind, identity, key)?;
    workspace.save_state()?;

    ui::success(&format!("Imported {kind} '{}' as {kind}.{key}", observed.identity));
    for error in &observed.decode_errors {
        ui::warn(&format!("Could not decode {error}"));
    }

    if !workspace
        .config
        .resources
        .iter()
        .any(|r| r.kind == kind && r.key == key)
    {
        ui::dim(&format!(
            "Add a [[resource]] with kind = \"{kind}\" and key = \"{key}\" to your config, or the next apply will delete it."
        ));
    }

    Ok(())
}

/// Read an existing instance and start tracking it under `key`.
fn import_into(workspace: &mut Workspace, kind: &str, identity: &str, key: &str) -> Result<Observed> {
    if let Some(tracked) = workspace.state.identity_for_key(kind, key)
        && tracked != identity
    {
        bail!("{kind}.{key} already tracks '{tracked}'. Destroy it or choose another --key.");
    }

    let observed = workspace
        .engine
        .import(kind, identity, &workspace.cancel)
        .with_context(|| format!("Failed to import {kind} '{identity}'"))?;

    workspace
        .state
        .record(kind, key, &observed.identity, observed.state.clone());
    log::info!("Tracking {kind} '{}' as {key}", observed.identity);

    Ok(observed)
}

// ============================================================================
// Show
// ============================================================================

pub fn show(ctx: &Context, kind: &str, identity: &str) -> Result<()> {
    let workspace = Workspace::open(ctx)?;
    let descriptor = workspace.engine.descriptor(kind)?;

    let observed = workspace
        .engine
        .read(kind, identity, &workspace.cancel)?
        .with_context(|| format!("{kind} '{identity}' not found on the device"))?;

    ui::header(&format!("{kind}: {}", observed.identity));

    match workspace.state.get(kind, &observed.identity) {
        Some(entry) => ui::kv("Tracked as", &format!("{kind}.{}", entry.key)),
        None => ui::kv("Tracked as", &"(not tracked)".dimmed().to_string()),
    }

    ui::section("Properties");
    for (name, value) in property_rows(&descriptor, &observed) {
        ui::kv(&name, &value);
    }

    if !observed.decode_errors.is_empty() {
        ui::section("Undecodable");
        for error in &observed.decode_errors {
            ui::warn(&error.to_string());
        }
    }

    Ok(())
}

/// Observed properties in declaration order, read-only ones marked.
fn property_rows(descriptor: &ResourceDescriptor, observed: &Observed) -> Vec<(String, String)> {
    descriptor
        .properties()
        .iter()
        .filter_map(|property| {
            let value = observed.state.get(property.name())?;
            let mut shown = ui::format_property(property.name(), value);
            if !property.is_writable() {
                shown.push_str(" (read-only)");
            }
            Some((property.name().to_string(), shown))
        })
        .collect()
}

// ============================================================================
// Destroy
// ============================================================================

pub fn destroy(ctx: &Context, kind: &str, identity: &str, yes: bool) -> Result<()> {
    let mut workspace = Workspace::open(ctx)?;

    let mut confirm = DialoguerConfirm::new(yes);
    if !confirm.confirm(&format!("Delete {kind} '{identity}' from the device?"))? {
        ui::info("Aborted");
        return Ok(());
    }

    let key = workspace.state.get(kind, identity).map(|e| e.key.clone());
    match destroy_in(&mut workspace, kind, identity)? {
        DeleteOutcome::Removed => ui::success(&format!("Deleted {kind} '{identity}'")),
        DeleteOutcome::AlreadyAbsent => ui::info(&format!("{kind} '{identity}' was already gone")),
    }
    workspace.save_state()?;

    if let Some(key) = key
        && workspace
            .config
            .resources
            .iter()
            .any(|r| r.kind == kind && r.key == key)
    {
        ui::warn(&format!(
            "{kind}.{key} is still in the config; the next apply will create it again."
        ));
    }

    Ok(())
}

/// Delete an instance and forget it. Absent instances are forgotten too.
fn destroy_in(workspace: &mut Workspace, kind: &str, identity: &str) -> Result<DeleteOutcome> {
    let outcome = workspace
        .engine
        .delete(kind, identity, &workspace.cancel)
        .with_context(|| format!("Failed to delete {kind} '{identity}'"))?;

    if workspace.state.forget(kind, identity).is_none() {
        log::debug!("{kind} '{identity}' was not tracked");
    }

    Ok(outcome)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoscfgConfig;
    use crate::resource;
    use crate::state::RoscfgState;
    use ::declarative::{CancelToken, Engine, ErrorCategory, MemoryDevice, RemoteRecord, Value};
    use std::sync::Arc;

    fn workspace(device: &Arc<MemoryDevice>, dir: &tempfile::TempDir) -> Workspace {
        Workspace {
            config: RoscfgConfig::parse("[device]\nurl = \"http://router\"\n").unwrap(),
            engine: Engine::new(Arc::new(resource::registry().unwrap()), device.clone()),
            state: RoscfgState::default(),
            state_path: dir.path().join("state.toml"),
            cancel: CancelToken::new(),
        }
    }

    fn seed_ether1(device: &MemoryDevice) {
        let mut record = RemoteRecord::new();
        record.insert("name".into(), "ether1".into());
        record.insert("mtu".into(), "1500".into());
        record.insert("running".into(), "true".into());
        device.insert("/interface/ethernet", record);
    }

    #[test]
    fn test_import_tracks_instance() {
        let device = Arc::new(MemoryDevice::new());
        seed_ether1(&device);
        let dir = tempfile::tempdir().unwrap();
        let mut workspace = workspace(&device, &dir);

        let observed = import_into(&mut workspace, "interface_ethernet", "ether1", "wan").unwrap();
        assert_eq!(observed.identity, "ether1");

        let entry = workspace.state.get("interface_ethernet", "ether1").unwrap();
        assert_eq!(entry.key, "wan");
        assert_eq!(entry.properties["mtu"], Value::Int(1500));
        assert_eq!(device.write_count(), 0);
    }

    #[test]
    fn test_import_missing_instance() {
        let device = Arc::new(MemoryDevice::new());
        let dir = tempfile::tempdir().unwrap();
        let mut workspace = workspace(&device, &dir);

        let err = import_into(&mut workspace, "interface_ethernet", "ether9", "wan").unwrap_err();
        let cause = err.downcast_ref::<::declarative::Error>().unwrap();
        assert_eq!(cause.category(), ErrorCategory::NotFound);
        assert!(workspace.state.is_empty());
    }

    #[test]
    fn test_import_refuses_taken_key() {
        let device = Arc::new(MemoryDevice::new());
        seed_ether1(&device);
        let dir = tempfile::tempdir().unwrap();
        let mut workspace = workspace(&device, &dir);
        workspace
            .state
            .record("interface_ethernet", "wan", "ether2", Default::default());

        let err = import_into(&mut workspace, "interface_ethernet", "ether1", "wan").unwrap_err();
        assert!(err.to_string().contains("already tracks 'ether2'"));
    }

    #[test]
    fn test_property_rows_mark_read_only() {
        let device = Arc::new(MemoryDevice::new());
        seed_ether1(&device);
        let dir = tempfile::tempdir().unwrap();
        let workspace = workspace(&device, &dir);

        let descriptor = workspace.engine.descriptor("interface_ethernet").unwrap();
        let observed = workspace
            .engine
            .read("interface_ethernet", "ether1", &workspace.cancel)
            .unwrap()
            .unwrap();
        let rows = property_rows(&descriptor, &observed);

        assert!(rows.contains(&("mtu".to_string(), "1500".to_string())));
        assert!(rows.contains(&("running".to_string(), "true (read-only)".to_string())));
    }

    #[test]
    fn test_destroy_forgets_instance() {
        let device = Arc::new(MemoryDevice::new());
        seed_ether1(&device);
        let dir = tempfile::tempdir().unwrap();
        let mut workspace = workspace(&device, &dir);
        import_into(&mut workspace, "interface_ethernet", "ether1", "wan").unwrap();

        let outcome = destroy_in(&mut workspace, "interface_ethernet", "ether1").unwrap();
        assert_eq!(outcome, DeleteOutcome::Removed);
        assert!(workspace.state.is_empty());
        assert!(device.records("/interface/ethernet").is_empty());

        let outcome = destroy_in(&mut workspace, "interface_ethernet", "ether1").unwrap();
        assert_eq!(outcome, DeleteOutcome::AlreadyAbsent);
    }
}
