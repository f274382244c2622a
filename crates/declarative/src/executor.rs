//! Execution engine - applies planned changes with bounded parallelism
//!
//! Deletes run first so a replacement elsewhere in the plan can reuse a
//! name that is being removed. Everything else runs after, `jobs` at a time.

use crate::client::CancelToken;
use crate::context::{ConfirmCallback, ProgressCallback};
use crate::engine::Engine;
use crate::planner::{Action, ExecutionPlan, PlannedChange};
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary, State};
use anyhow::Result;
use rayon::prelude::*;
use std::sync::{Arc, Mutex};

/// Result of applying one planned change
#[derive(Debug, Clone)]
pub struct ChangeOutcome {
    pub kind: String,
    pub key: String,
    /// Identity before the change, when the instance was tracked
    pub previous_identity: Option<String>,
    pub result: ApplyResult,
}

impl ChangeOutcome {
    /// `kind.key`
    pub fn target(&self) -> String {
        format!("{}.{}", self.kind, self.key)
    }
}

/// Everything that happened during one execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteReport {
    pub outcomes: Vec<ChangeOutcome>,
    pub summary: ExecuteSummary,
}

impl ExecuteReport {
    fn push(&mut self, outcome: ChangeOutcome) {
        self.summary.add_result(&outcome.result);
        self.outcomes.push(outcome);
    }
}

/// Execute a plan with the given options and callbacks
///
/// # Type Parameters
/// * `P` - Progress callback type
/// * `C` - Confirm callback type
///
/// # Returns
/// Per-instance outcomes and a summary. Individual failures are recorded as
/// [`ApplyResult::Failed`]; only callback errors abort.
pub fn execute<P, C>(
    plan: ExecutionPlan,
    engine: &Engine,
    opts: ExecuteOptions,
    cancel: &CancelToken,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteReport>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let mut report = ExecuteReport::default();

    let (pending, unchanged): (Vec<_>, Vec<_>) = plan
        .changes
        .into_iter()
        .partition(|c| c.action.is_change());

    for change in unchanged {
        report.push(outcome(&change, ApplyResult::NoChange));
    }

    if pending.is_empty() {
        return Ok(report);
    }

    if opts.dry_run {
        for change in &pending {
            report.push(outcome(
                change,
                ApplyResult::Skipped {
                    reason: "Dry run".into(),
                },
            ));
        }
        return Ok(report);
    }

    // Confirm before proceeding
    if !confirm.confirm(&format!("Apply {} change(s)?", pending.len()))? {
        for change in &pending {
            report.push(outcome(
                change,
                ApplyResult::Skipped {
                    reason: "Declined".into(),
                },
            ));
        }
        return Ok(report);
    }

    let (deletes, rest): (Vec<_>, Vec<_>) = pending
        .into_iter()
        .partition(|c| matches!(c.action, Action::Delete));

    progress.on_batch_start(deletes.len() + rest.len());
    for batch in [deletes, rest] {
        if batch.is_empty() {
            continue;
        }
        for o in execute_batch(&batch, engine, opts.jobs, cancel, progress)? {
            report.push(o);
        }
    }
    progress.on_batch_complete();

    Ok(report)
}

/// Execute a batch of changes
fn execute_batch<P: ProgressCallback>(
    changes: &[PlannedChange],
    engine: &Engine,
    jobs: usize,
    cancel: &CancelToken,
    progress: &mut P,
) -> Result<Vec<ChangeOutcome>> {
    if jobs <= 1 || changes.len() == 1 {
        // Sequential execution
        let mut outcomes = Vec::with_capacity(changes.len());
        for change in changes {
            let target = change.target();
            progress.on_change_start(&target, &change.description());
            let result = apply_change(change, engine, cancel);
            progress.on_change_complete(&target, &result);
            outcomes.push(outcome(change, result));
        }
        Ok(outcomes)
    } else {
        execute_parallel(changes, engine, jobs, cancel, progress)
    }
}

/// Execute changes in parallel using rayon
fn execute_parallel<P: ProgressCallback>(
    changes: &[PlannedChange],
    engine: &Engine,
    jobs: usize,
    cancel: &CancelToken,
    progress: &mut P,
) -> Result<Vec<ChangeOutcome>> {
    // The progress callback is not thread-safe; collect results and report after.
    let results: Arc<Mutex<Vec<(usize, ApplyResult)>>> = Arc::new(Mutex::new(Vec::new()));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {}", e))?;

    pool.install(|| {
        changes.par_iter().enumerate().for_each(|(index, change)| {
            let result = apply_change(change, engine, cancel);
            results
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((index, result));
        });
    });

    let mut results = Arc::try_unwrap(results)
        .map_err(|_| anyhow::anyhow!("Failed to unwrap results"))?
        .into_inner()
        .unwrap_or_else(|e| e.into_inner());
    results.sort_by_key(|(index, _)| *index);

    let mut outcomes = Vec::with_capacity(results.len());
    for (index, result) in results {
        let change = &changes[index];
        progress.on_change_complete(&change.target(), &result);
        outcomes.push(outcome(change, result));
    }
    Ok(outcomes)
}

/// Apply a single change
fn apply_change(change: &PlannedChange, engine: &Engine, cancel: &CancelToken) -> ApplyResult {
    let empty = State::new();
    let desired = change.desired.as_ref().unwrap_or(&empty);
    let identity = change.identity.as_deref();

    let applied = match (&change.action, identity) {
        (Action::Unchanged, _) => return ApplyResult::NoChange,
        (Action::Create, _) => engine
            .create(&change.kind, desired, cancel)
            .map(|o| ApplyResult::Created {
                identity: o.identity,
                state: o.state,
            }),
        (Action::Update(_), Some(identity)) => {
            let observed = change.observed.as_ref().unwrap_or(&empty);
            engine
                .update(&change.kind, identity, observed, desired, cancel)
                .map(|o| ApplyResult::Modified {
                    identity: o.identity,
                    state: o.state,
                })
        }
        (Action::Replace(_), Some(identity)) => engine
            .delete(&change.kind, identity, cancel)
            .and_then(|_| engine.create(&change.kind, desired, cancel))
            .map(|o| ApplyResult::Replaced {
                identity: o.identity,
                state: o.state,
            }),
        (Action::Delete, Some(identity)) => engine
            .delete(&change.kind, identity, cancel)
            .map(|_| ApplyResult::Removed),
        (Action::Delete, None) => Ok(ApplyResult::Removed),
        (Action::Update(_) | Action::Replace(_), None) => {
            return ApplyResult::Failed {
                error: format!("{} has no identity on the device", change.target()),
            };
        }
    };

    applied.unwrap_or_else(|e| {
        log::debug!("{} failed: {}", change.target(), e);
        ApplyResult::Failed {
            error: e.to_string(),
        }
    })
}

fn outcome(change: &PlannedChange, result: ApplyResult) -> ChangeOutcome {
    ChangeOutcome {
        kind: change.kind.clone(),
        key: change.key.clone(),
        previous_identity: change.identity.clone(),
        result,
    }
}
