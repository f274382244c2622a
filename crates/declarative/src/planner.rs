//! Execution planner - classifies instances into planned changes
//!
//! The planner compares the desired instances against the instances already
//! tracked in state, refreshes every tracked instance from the device, and
//! decides what each one needs.

use crate::client::CancelToken;
use crate::diff::{Diff, DiffSummary};
use crate::engine::Engine;
use crate::error::Error;
use crate::types::State;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// An instance the caller wants to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredInstance {
    /// Resource kind
    pub kind: String,
    /// Local label, unique per kind
    pub key: String,
    /// Desired properties
    pub properties: State,
}

/// An instance created or imported earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedInstance {
    pub kind: String,
    pub key: String,
    /// Identity on the device
    pub identity: String,
    /// Properties as last recorded
    pub properties: State,
}

/// What an instance needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Not on the device yet (or gone since last run)
    Create,
    /// Writable properties differ
    Update(Diff),
    /// A write-once property differs; destroy and recreate
    Replace(Diff),
    /// Tracked but no longer desired
    Delete,
    /// Already converged
    Unchanged,
}

impl Action {
    /// Short verb for display
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update(_) => "update",
            Self::Replace(_) => "replace",
            Self::Delete => "delete",
            Self::Unchanged => "unchanged",
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// One instance and what will be done to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
    pub kind: String,
    pub key: String,
    /// Identity on the device, when tracked
    pub identity: Option<String>,
    pub action: Action,
    /// Desired properties, absent for deletes
    pub desired: Option<State>,
    /// Freshly read state, absent when not on the device
    pub observed: Option<State>,
}

impl PlannedChange {
    /// `kind.key`, as accepted by [`ExecutionPlan::filter_by_target`]
    pub fn target(&self) -> String {
        format!("{}.{}", self.kind, self.key)
    }

    /// Human-readable description
    pub fn description(&self) -> String {
        match &self.identity {
            Some(identity) => format!("{} {} '{}'", self.action.verb(), self.kind, identity),
            None => format!("{} {} {}", self.action.verb(), self.kind, self.key),
        }
    }
}

/// Planned changes for a set of instances
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    pub changes: Vec<PlannedChange>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a plan.
    ///
    /// Desired state is validated first, so a bad value fails the plan before
    /// anything is read. Tracked instances are then refreshed in parallel on
    /// `jobs` threads. A tracked instance missing from the device is drift
    /// and gets planned as a create.
    pub fn build(
        engine: &Engine,
        desired: &[DesiredInstance],
        tracked: &[TrackedInstance],
        jobs: usize,
        cancel: &CancelToken,
    ) -> Result<Self> {
        let tracked_by_key: BTreeMap<(&str, &str), &TrackedInstance> = tracked
            .iter()
            .map(|t| ((t.kind.as_str(), t.key.as_str()), t))
            .collect();

        for instance in desired {
            let descriptor = engine.descriptor(&instance.kind)?;
            let creating = !tracked_by_key.contains_key(&(instance.kind.as_str(), instance.key.as_str()));
            descriptor
                .validate_desired(&instance.properties, creating)
                .with_context(|| format!("Invalid {}.{}", instance.kind, instance.key))?;
        }

        let observed = refresh(engine, tracked, jobs, cancel)?;

        let mut changes = Vec::new();
        let mut seen = BTreeSet::new();

        for instance in desired {
            let id = (instance.kind.as_str(), instance.key.as_str());
            seen.insert(id);

            let Some(tracked) = tracked_by_key.get(&id) else {
                changes.push(PlannedChange {
                    kind: instance.kind.clone(),
                    key: instance.key.clone(),
                    identity: None,
                    action: Action::Create,
                    desired: Some(instance.properties.clone()),
                    observed: None,
                });
                continue;
            };

            let current = observed.get(&id).cloned().flatten();
            let action = match &current {
                None => {
                    log::warn!(
                        "{} '{}' is tracked but missing on the device",
                        tracked.kind,
                        tracked.identity
                    );
                    Action::Create
                }
                Some(state) => {
                    let diff = engine.diff(&instance.kind, state, &instance.properties)?;
                    if diff.is_empty() {
                        Action::Unchanged
                    } else if diff.requires_replace() {
                        Action::Replace(diff)
                    } else {
                        Action::Update(diff)
                    }
                }
            };

            changes.push(PlannedChange {
                kind: instance.kind.clone(),
                key: instance.key.clone(),
                identity: current.as_ref().map(|_| tracked.identity.clone()),
                action,
                desired: Some(instance.properties.clone()),
                observed: current,
            });
        }

        for t in tracked {
            let id = (t.kind.as_str(), t.key.as_str());
            if seen.contains(&id) {
                continue;
            }
            changes.push(PlannedChange {
                kind: t.kind.clone(),
                key: t.key.clone(),
                identity: Some(t.identity.clone()),
                action: Action::Delete,
                desired: None,
                observed: observed.get(&id).cloned().flatten(),
            });
        }

        Ok(Self { changes })
    }

    /// Filter plan to only include changes matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&PlannedChange) -> bool,
    {
        Self {
            changes: self.changes.into_iter().filter(|c| predicate(c)).collect(),
        }
    }

    /// Filter plan to only include changes matching a target pattern
    ///
    /// Target format: "kind" or "kind.key"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => self.filter(|c| matches_target(t, &c.kind, &c.key)),
        }
    }

    /// Changes that actually do something
    pub fn pending(&self) -> impl Iterator<Item = &PlannedChange> {
        self.changes.iter().filter(|c| c.action.is_change())
    }

    /// Count changes by action
    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        for change in &self.changes {
            match change.action {
                Action::Create => summary.additions += 1,
                Action::Update(_) => summary.modifications += 1,
                Action::Replace(_) => summary.replacements += 1,
                Action::Delete => summary.removals += 1,
                Action::Unchanged => {}
            }
        }
        summary
    }

    /// Total number of instances in the plan
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

type Refreshed<'a> = BTreeMap<(&'a str, &'a str), Option<State>>;

/// Read every tracked instance, `jobs` at a time.
fn refresh<'a>(
    engine: &Engine,
    tracked: &'a [TrackedInstance],
    jobs: usize,
    cancel: &CancelToken,
) -> Result<Refreshed<'a>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .context("Failed to create thread pool")?;

    let results: Vec<(&TrackedInstance, Result<Option<State>, Error>)> = pool.install(|| {
        tracked
            .par_iter()
            .map(|t| {
                let state = engine
                    .read(&t.kind, &t.identity, cancel)
                    .map(|o| o.map(|o| o.state));
                (t, state)
            })
            .collect()
    });

    let mut observed = Refreshed::new();
    for (t, result) in results {
        let state = result.with_context(|| format!("Failed to read {} '{}'", t.kind, t.identity))?;
        observed.insert((t.kind.as_str(), t.key.as_str()), state);
    }
    Ok(observed)
}

/// Parse a target string like "kind.key" into (kind, key)
fn parse_target(target: &str) -> (String, Option<String>) {
    match target.split_once('.') {
        Some((kind, key)) => (kind.to_string(), Some(key.to_string())),
        None => (target.to_string(), None),
    }
}

/// Whether an instance falls under a target.
///
/// The kind part matches by prefix, so `interface` selects every
/// interface kind.
pub fn matches_target(target: &str, kind: &str, key: &str) -> bool {
    let (target_kind, target_key) = parse_target(target);
    if !kind.starts_with(&target_kind) {
        return false;
    }

    if let Some(k) = target_key
        && key != k
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDevice;
    use crate::property::PropertyDescriptor;
    use crate::resource::{Registry, ResourceDescriptor};
    use crate::types::Value;
    use std::sync::Arc;

    fn engine() -> (Engine, Arc<MemoryDevice>) {
        let bonding = ResourceDescriptor::builder("interface_bonding", "/interface/bonding")
            .identity("name")
            .property(PropertyDescriptor::string("name").force_new().required())
            .property(PropertyDescriptor::unordered_list("slaves"))
            .property(PropertyDescriptor::string("comment"))
            .build()
            .unwrap();
        let mut registry = Registry::new();
        registry.register(bonding).unwrap();
        let device = Arc::new(MemoryDevice::new());
        (Engine::new(Arc::new(registry), device.clone()), device)
    }

    fn bond(key: &str, name: &str, comment: &str) -> DesiredInstance {
        let mut properties = State::new();
        properties.insert("name".into(), Value::from(name));
        properties.insert("comment".into(), Value::from(comment));
        DesiredInstance {
            kind: "interface_bonding".into(),
            key: key.into(),
            properties,
        }
    }

    fn track(engine: &Engine, instance: &DesiredInstance) -> TrackedInstance {
        let observed = engine
            .create(&instance.kind, &instance.properties, &CancelToken::new())
            .unwrap();
        TrackedInstance {
            kind: instance.kind.clone(),
            key: instance.key.clone(),
            identity: observed.identity,
            properties: observed.state,
        }
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("interface_bonding"), ("interface_bonding".to_string(), None));
        assert_eq!(
            parse_target("interface_bonding.uplink"),
            ("interface_bonding".to_string(), Some("uplink".to_string()))
        );
        assert_eq!(
            parse_target("interface_bonding.lan.v2"),
            ("interface_bonding".to_string(), Some("lan.v2".to_string()))
        );
    }

    #[test]
    fn test_classifies_each_action() {
        let (engine, device) = engine();
        let unchanged = bond("a", "bond-a", "same");
        let updated = bond("b", "bond-b", "old");
        let replaced = bond("c", "bond-c", "x");
        let deleted = bond("d", "bond-d", "x");
        let drifted = bond("e", "bond-e", "x");
        let tracked = vec![
            track(&engine, &unchanged),
            track(&engine, &updated),
            track(&engine, &replaced),
            track(&engine, &deleted),
            track(&engine, &drifted),
        ];
        engine
            .delete("interface_bonding", "bond-e", &CancelToken::new())
            .unwrap();
        device.clear_calls();

        let desired = vec![
            unchanged,
            bond("b", "bond-b", "new"),
            bond("c", "bond-c2", "x"),
            drifted,
            bond("f", "bond-f", "x"),
        ];
        let plan = ExecutionPlan::build(&engine, &desired, &tracked, 2, &CancelToken::new()).unwrap();

        let actions: BTreeMap<_, _> = plan
            .changes
            .iter()
            .map(|c| (c.key.as_str(), c.action.verb()))
            .collect();
        assert_eq!(actions["a"], "unchanged");
        assert_eq!(actions["b"], "update");
        assert_eq!(actions["c"], "replace");
        assert_eq!(actions["d"], "delete");
        assert_eq!(actions["e"], "create");
        assert_eq!(actions["f"], "create");

        let summary = plan.summary();
        assert_eq!(summary.additions, 2);
        assert_eq!(summary.modifications, 1);
        assert_eq!(summary.replacements, 1);
        assert_eq!(summary.removals, 1);
        assert_eq!(plan.pending().count(), 5);

        // planning only reads
        assert_eq!(device.write_count(), 0);
    }

    #[test]
    fn test_invalid_desired_fails_before_reads() {
        let (engine, device) = engine();
        let mut bad = bond("a", "bond-a", "x");
        bad.properties.insert("speed".into(), Value::from("10G"));
        let err = ExecutionPlan::build(&engine, &[bad], &[], 1, &CancelToken::new()).unwrap_err();
        assert!(format!("{err:#}").contains("speed"));
        assert_eq!(device.call_count(), 0);
    }

    #[test]
    fn test_refresh_failure_fails_plan() {
        let (engine, device) = engine();
        let instance = bond("a", "bond-a", "x");
        let tracked = vec![track(&engine, &instance)];
        device.fail_transport(1);
        let err = ExecutionPlan::build(&engine, &[instance], &tracked, 1, &CancelToken::new())
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read"));
    }

    #[test]
    fn test_filter_by_target() {
        let (engine, _device) = engine();
        let desired = vec![bond("a", "bond-a", "x"), bond("b", "bond-b", "x")];
        let plan = ExecutionPlan::build(&engine, &desired, &[], 1, &CancelToken::new()).unwrap();
        assert_eq!(plan.clone().filter_by_target(None).len(), 2);
        assert_eq!(plan.clone().filter_by_target(Some("interface")).len(), 2);
        assert_eq!(plan.clone().filter_by_target(Some("interface_bonding.b")).len(), 1);
        assert_eq!(plan.filter_by_target(Some("interface_wireless")).len(), 0);
    }
}
