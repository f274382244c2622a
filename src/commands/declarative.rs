//! Declarative commands
//!
//! - `plan` - Preview what apply would change on the device
//! - `apply` - Make the device match the config
//!
//! Both refresh every tracked instance from the device first, so drift
//! since the last run shows up in the plan.

use anyhow::{Result, bail};
use ::declarative::{ExecuteOptions, ExecutionPlan, execute, matches_target};

use super::Workspace;
use crate::Context;
use crate::engine::{DialoguerConfirm, TerminalProgress, display_plan, print_summary};
use crate::ui;

/// Options for `roscfg apply`
#[derive(Debug, Clone)]
pub struct ApplyOptions<'a> {
    pub target: Option<&'a str>,
    pub dry_run: bool,
    pub yes: bool,
    pub jobs: usize,
}

// ============================================================================
// Plan
// ============================================================================

pub fn plan(ctx: &Context, target: Option<&str>, jobs: usize) -> Result<()> {
    let workspace = Workspace::open(ctx)?;

    if !ctx.quiet {
        ui::header("Planning Configuration");
    }

    let plan = build_plan(&workspace, target, jobs)?;
    display_plan(&plan, ctx.verbose > 0);

    Ok(())
}

// ============================================================================
// Apply
// ============================================================================

pub fn apply(ctx: &Context, opts: &ApplyOptions<'_>) -> Result<()> {
    let mut workspace = Workspace::open(ctx)?;
    run_apply(ctx, &mut workspace, opts)
}

fn run_apply(ctx: &Context, workspace: &mut Workspace, opts: &ApplyOptions<'_>) -> Result<()> {
    if !ctx.quiet {
        ui::header("Applying Configuration");
    }
    if opts.dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let plan = build_plan(workspace, opts.target, opts.jobs)?;
    display_plan(&plan, ctx.verbose > 0);

    if plan.pending().next().is_none() {
        return Ok(());
    }

    let mut progress = TerminalProgress::new(ctx.verbose > 0);
    let mut confirm = DialoguerConfirm::new(opts.yes);
    let report = execute(
        plan,
        &workspace.engine,
        ExecuteOptions {
            dry_run: opts.dry_run,
            jobs: opts.jobs,
            verbose: ctx.verbose > 0,
        },
        &workspace.cancel,
        &mut progress,
        &mut confirm,
    )?;

    // Whatever succeeded is recorded, even when other changes failed
    if !opts.dry_run {
        workspace.state.apply_outcomes(&report.outcomes);
        workspace.save_state()?;
    }

    print_summary(&report);

    if opts.dry_run {
        println!();
        ui::info("Dry run - no changes made");
    }

    if !report.summary.is_success() {
        bail!("{} change(s) failed", report.summary.failed);
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Plan the instances under `target`, reading only those from the device.
fn build_plan(workspace: &Workspace, target: Option<&str>, jobs: usize) -> Result<ExecutionPlan> {
    let in_target =
        |kind: &str, key: &str| target.is_none_or(|target| matches_target(target, kind, key));

    let desired: Vec<_> = workspace
        .config
        .desired_instances()?
        .into_iter()
        .filter(|d| in_target(&d.kind, &d.key))
        .collect();
    let tracked: Vec<_> = workspace
        .state
        .tracked()
        .into_iter()
        .filter(|t| in_target(&t.kind, &t.key))
        .collect();

    log::debug!(
        "Planning {} desired and {} tracked instances",
        desired.len(),
        tracked.len()
    );

    ExecutionPlan::build(&workspace.engine, &desired, &tracked, jobs, &workspace.cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoscfgConfig;
    use crate::resource;
    use crate::state::RoscfgState;
    use ::declarative::{CancelToken, Engine, MemoryDevice, RemoteRecord, Value};
    use std::sync::Arc;

    const CONFIG: &str = r#"
[device]
url = "http://router"
password = "secret"

[[resource]]
kind = "interface_bonding"
key = "uplink"

[resource.properties]
name = "bond1"
slaves = ["ether3", "ether4"]

[[resource]]
kind = "interface_ethernet"
key = "wan"

[resource.properties]
name = "ether1"
mtu = 1500
"#;

    fn ctx() -> Context {
        Context {
            verbose: 0,
            quiet: true,
            config_path: None,
            state_path: None,
        }
    }

    fn workspace(device: &Arc<MemoryDevice>, dir: &tempfile::TempDir) -> Workspace {
        Workspace {
            config: RoscfgConfig::parse(CONFIG).unwrap(),
            engine: Engine::new(Arc::new(resource::registry().unwrap()), device.clone()),
            state: RoscfgState::default(),
            state_path: dir.path().join("state.toml"),
            cancel: CancelToken::new(),
        }
    }

    fn opts(target: Option<&str>) -> ApplyOptions<'_> {
        ApplyOptions {
            target,
            dry_run: false,
            yes: true,
            jobs: 2,
        }
    }

    #[test]
    fn test_build_plan_respects_target() {
        let device = Arc::new(MemoryDevice::new());
        let dir = tempfile::tempdir().unwrap();
        let workspace = workspace(&device, &dir);

        let plan = build_plan(&workspace, None, 2).unwrap();
        assert_eq!(plan.summary().additions, 2);

        let plan = build_plan(&workspace, Some("interface_bonding"), 2).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.changes[0].key, "uplink");
    }

    #[test]
    fn test_apply_tracks_created_instances() {
        let device = Arc::new(MemoryDevice::new());
        let dir = tempfile::tempdir().unwrap();
        let mut workspace = workspace(&device, &dir);

        run_apply(&ctx(), &mut workspace, &opts(Some("interface_bonding.uplink"))).unwrap();

        let entry = workspace.state.get("interface_bonding", "bond1").unwrap();
        assert_eq!(entry.key, "uplink");
        assert_eq!(entry.properties["slaves"], Value::list(["ether3", "ether4"]));

        // State reached disk
        let saved = RoscfgState::load(&workspace.state_path).unwrap();
        assert_eq!(saved.len(), 1);

        // A second run has nothing to do
        device.clear_calls();
        run_apply(&ctx(), &mut workspace, &opts(Some("interface_bonding"))).unwrap();
        assert_eq!(device.write_count(), 0);
    }

    #[test]
    fn test_apply_dry_run_changes_nothing() {
        let device = Arc::new(MemoryDevice::new());
        let dir = tempfile::tempdir().unwrap();
        let mut workspace = workspace(&device, &dir);

        let options = ApplyOptions {
            dry_run: true,
            ..opts(None)
        };
        run_apply(&ctx(), &mut workspace, &options).unwrap();

        assert_eq!(device.write_count(), 0);
        assert!(workspace.state.is_empty());
        assert!(!workspace.state_path.exists());
    }

    #[test]
    fn test_apply_reports_failures() {
        let device = Arc::new(MemoryDevice::new());
        let mut record = RemoteRecord::new();
        record.insert("name".into(), "ether1".into());
        device.insert("/interface/ethernet", record);
        device.reject(
            "/interface/bonding",
            "slaves",
            None,
            "input does not match any value of slaves",
        );

        let dir = tempfile::tempdir().unwrap();
        let mut workspace = workspace(&device, &dir);
        let err = run_apply(&ctx(), &mut workspace, &opts(Some("interface_bonding"))).unwrap_err();
        assert!(err.to_string().contains("1 change(s) failed"));
        assert!(workspace.state.is_empty());
    }
}
