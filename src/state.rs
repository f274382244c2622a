//! Tracked state of managed instances
//!
//! The state file records which device instances roscfg manages and what
//! they looked like after the last successful operation:
//!
//! ```toml
//! last_updated = "2026-10-19T08:00:00Z"
//!
//! [resources.interface_bonding.bond1]
//! key = "uplink"
//!
//! [resources.interface_bonding.bond1.properties]
//! name = "bond1"
//! slaves = ["ether3", "ether4"]
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::{ApplyResult, ChangeOutcome, State, TrackedInstance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ============================================================================
// State Structures
// ============================================================================

/// Everything roscfg tracks
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RoscfgState {
    /// Last time the state was saved
    pub last_updated: DateTime<Utc>,

    /// kind -> identity -> entry
    #[serde(default)]
    pub resources: BTreeMap<String, BTreeMap<String, TrackedEntry>>,
}

/// One tracked instance
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TrackedEntry {
    /// Config key this instance belongs to
    pub key: String,

    /// Typed properties as last observed
    #[serde(default)]
    pub properties: State,
}

impl Default for RoscfgState {
    fn default() -> Self {
        Self {
            last_updated: Utc::now(),
            resources: BTreeMap::new(),
        }
    }
}

// ============================================================================
// RoscfgState Implementation
// ============================================================================

impl RoscfgState {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using default state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(state)
    }

    /// Update the timestamp and save to disk
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.last_updated = Utc::now();

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(&self).context("Failed to serialize state to TOML")?;

        fs::write(path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Every tracked instance, for planning
    pub fn tracked(&self) -> Vec<TrackedInstance> {
        self.resources
            .iter()
            .flat_map(|(kind, entries)| {
                entries.iter().map(move |(identity, entry)| TrackedInstance {
                    kind: kind.clone(),
                    key: entry.key.clone(),
                    identity: identity.clone(),
                    properties: entry.properties.clone(),
                })
            })
            .collect()
    }

    /// Get a tracked entry
    pub fn get(&self, kind: &str, identity: &str) -> Option<&TrackedEntry> {
        self.resources.get(kind).and_then(|entries| entries.get(identity))
    }

    /// Identity tracked under a config key
    pub fn identity_for_key(&self, kind: &str, key: &str) -> Option<&str> {
        self.resources.get(kind).and_then(|entries| {
            entries
                .iter()
                .find(|(_, entry)| entry.key == key)
                .map(|(identity, _)| identity.as_str())
        })
    }

    /// Track an instance. Any other instance of the kind under the same key
    /// is dropped, so a key always maps to one identity.
    pub fn record(&mut self, kind: &str, key: &str, identity: &str, properties: State) {
        let entries = self.resources.entry(kind.to_string()).or_default();
        entries.retain(|id, entry| id == identity || entry.key != key);
        entries.insert(
            identity.to_string(),
            TrackedEntry {
                key: key.to_string(),
                properties,
            },
        );
    }

    /// Stop tracking an instance
    pub fn forget(&mut self, kind: &str, identity: &str) -> Option<TrackedEntry> {
        let entries = self.resources.get_mut(kind)?;
        let removed = entries.remove(identity);
        if entries.is_empty() {
            self.resources.remove(kind);
        }
        removed
    }

    /// Fold executor outcomes into the tracked state.
    ///
    /// Failed and skipped changes leave their entries untouched.
    pub fn apply_outcomes(&mut self, outcomes: &[ChangeOutcome]) {
        for outcome in outcomes {
            match &outcome.result {
                ApplyResult::Created { identity, state }
                | ApplyResult::Modified { identity, state }
                | ApplyResult::Replaced { identity, state } => {
                    if let Some(previous) = &outcome.previous_identity
                        && previous != identity
                    {
                        self.forget(&outcome.kind, previous);
                    }
                    self.record(&outcome.kind, &outcome.key, identity, state.clone());
                }
                ApplyResult::Removed => {
                    if let Some(previous) = &outcome.previous_identity {
                        self.forget(&outcome.kind, previous);
                    }
                }
                ApplyResult::NoChange
                | ApplyResult::Failed { .. }
                | ApplyResult::Skipped { .. } => {}
            }
        }
    }

    /// Number of tracked instances
    pub fn len(&self) -> usize {
        self.resources.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::Value;

    fn bond_state(name: &str) -> State {
        let mut state = State::new();
        state.insert("name".into(), Value::from(name));
        state.insert("slaves".into(), Value::list(["ether3", "ether4"]));
        state.insert("mtu".into(), Value::Int(1500));
        state.insert("disabled".into(), Value::Bool(false));
        state
    }

    fn outcome(key: &str, previous: Option<&str>, result: ApplyResult) -> ChangeOutcome {
        ChangeOutcome {
            kind: "interface_bonding".into(),
            key: key.into(),
            previous_identity: previous.map(str::to_string),
            result,
        }
    }

    #[test]
    fn test_default_state() {
        let state = RoscfgState::default();
        assert!(state.is_empty());
        assert!(state.tracked().is_empty());
    }

    #[test]
    fn test_record_and_forget() {
        let mut state = RoscfgState::default();
        state.record("interface_bonding", "uplink", "bond1", bond_state("bond1"));
        assert_eq!(state.len(), 1);
        assert_eq!(
            state.identity_for_key("interface_bonding", "uplink"),
            Some("bond1")
        );

        let tracked = state.tracked();
        assert_eq!(tracked[0].identity, "bond1");
        assert_eq!(tracked[0].key, "uplink");

        assert!(state.forget("interface_bonding", "bond1").is_some());
        assert!(state.forget("interface_bonding", "bond1").is_none());
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_record_replaces_same_key() {
        let mut state = RoscfgState::default();
        state.record("interface_bonding", "uplink", "bond1", bond_state("bond1"));
        state.record("interface_bonding", "uplink", "bond2", bond_state("bond2"));
        assert_eq!(state.len(), 1);
        assert!(state.get("interface_bonding", "bond2").is_some());
    }

    #[test]
    fn test_apply_outcomes() {
        let mut state = RoscfgState::default();
        state.record("interface_bonding", "old", "bond9", bond_state("bond9"));
        state.record("interface_bonding", "uplink", "bond1", bond_state("bond1"));

        state.apply_outcomes(&[
            outcome(
                "uplink",
                Some("bond1"),
                ApplyResult::Replaced {
                    identity: "bond2".into(),
                    state: bond_state("bond2"),
                },
            ),
            outcome("old", Some("bond9"), ApplyResult::Removed),
            outcome(
                "new",
                None,
                ApplyResult::Failed {
                    error: "device rejected change".into(),
                },
            ),
        ]);

        assert_eq!(state.len(), 1);
        assert!(state.get("interface_bonding", "bond2").is_some());
        assert!(state.get("interface_bonding", "bond1").is_none());
        assert!(state.get("interface_bonding", "bond9").is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.toml");

        let mut state = RoscfgState::default();
        state.record("interface_bonding", "uplink", "bond1", bond_state("bond1"));
        state.save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[resources.interface_bonding.bond1]"));

        let loaded = RoscfgState::load(&path).unwrap();
        assert_eq!(
            loaded.get("interface_bonding", "bond1"),
            state.get("interface_bonding", "bond1")
        );
    }

    #[test]
    fn test_load_missing_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let state = RoscfgState::load(&dir.path().join("state.toml")).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_load_corrupt_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "last_updated = [").unwrap();
        let err = RoscfgState::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse state file"));
    }
}
