//! Plan display - roscfg-specific UI

use crate::ui::format_property;
use colored::{ColoredString, Colorize};
use declarative::{Action, Diff, ExecutionPlan, PlannedChange, State};
use std::collections::BTreeMap;

/// Display a plan in a user-friendly format
///
/// Unchanged instances are only listed when `verbose` is set.
pub fn display_plan(plan: &ExecutionPlan, verbose: bool) {
    let summary = plan.summary();
    if !summary.has_changes() && !verbose {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    // Group by kind
    let mut by_kind: BTreeMap<&str, Vec<&PlannedChange>> = BTreeMap::new();
    for change in &plan.changes {
        if change.action.is_change() || verbose {
            by_kind.entry(change.kind.as_str()).or_default().push(change);
        }
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Configuration Plan".bold()
    );
    println!("│");

    for (kind, changes) in &by_kind {
        println!("│ {}", kind.bold());

        for change in changes {
            let label = match &change.identity {
                Some(identity) if identity != &change.key => {
                    format!("{} ({identity})", change.key)
                }
                _ => change.key.clone(),
            };
            println!(
                "│   {} {:<30} {}",
                symbol(&change.action),
                label,
                change.action.verb().dimmed()
            );

            for line in detail_lines(change) {
                println!("│       {}", line.dimmed());
            }
        }
        println!("│");
    }

    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} to create, {} to update, {} to replace, {} to delete",
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.replacements.to_string().magenta(),
        summary.removals.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

fn symbol(action: &Action) -> ColoredString {
    match action {
        Action::Create => "+".green(),
        Action::Update(_) => "~".yellow(),
        Action::Replace(_) => "±".magenta(),
        Action::Delete => "-".red(),
        Action::Unchanged => "○".dimmed(),
    }
}

/// Property lines shown under a planned change
pub fn detail_lines(change: &PlannedChange) -> Vec<String> {
    match (&change.action, &change.desired) {
        (Action::Update(diff) | Action::Replace(diff), _) => diff_lines(diff),
        (Action::Create, Some(desired)) => state_lines(desired),
        _ => Vec::new(),
    }
}

/// `name: old → new` per changed property
pub fn diff_lines(diff: &Diff) -> Vec<String> {
    diff.changes
        .iter()
        .map(|change| {
            let old = change.old.as_ref().map_or_else(
                || "(unset)".to_string(),
                |old| format_property(&change.name, old),
            );
            let new = format_property(&change.name, &change.new);
            let marker = if change.is_force_new() {
                " (forces replacement)"
            } else {
                ""
            };
            format!("{}: {old} → {new}{marker}", change.name)
        })
        .collect()
}

fn state_lines(state: &State) -> Vec<String> {
    state
        .iter()
        .map(|(name, value)| format!("{name} = {}", format_property(name, value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{Mutability, PropertyChange, Value, ValueType};

    fn change(action: Action, desired: Option<State>) -> PlannedChange {
        PlannedChange {
            kind: "interface_bonding".into(),
            key: "uplink".into(),
            identity: Some("bond1".into()),
            action,
            desired,
            observed: None,
        }
    }

    #[test]
    fn test_diff_lines() {
        let diff = Diff {
            changes: vec![
                PropertyChange {
                    name: "mtu".into(),
                    old: Some(Value::Int(1500)),
                    new: Value::Int(9000),
                    value_type: ValueType::Int,
                    mutability: Mutability::ReadWrite,
                },
                PropertyChange {
                    name: "name".into(),
                    old: Some(Value::from("bond1")),
                    new: Value::from("bond2"),
                    value_type: ValueType::String,
                    mutability: Mutability::WriteOnceForceReplace,
                },
                PropertyChange {
                    name: "comment".into(),
                    old: None,
                    new: Value::from("uplink"),
                    value_type: ValueType::String,
                    mutability: Mutability::ReadWrite,
                },
            ],
        };

        assert_eq!(
            diff_lines(&diff),
            vec![
                "mtu: 1500 → 9000".to_string(),
                "name: bond1 → bond2 (forces replacement)".to_string(),
                "comment: (unset) → uplink".to_string(),
            ]
        );
    }

    #[test]
    fn test_create_lists_desired_properties() {
        let mut desired = State::new();
        desired.insert("name".into(), Value::from("bond1"));
        desired.insert("slaves".into(), Value::list(["ether3", "ether4"]));

        let lines = detail_lines(&change(Action::Create, Some(desired)));
        assert_eq!(lines, vec!["name = bond1", "slaves = [ether3, ether4]"]);
    }

    #[test]
    fn test_delete_has_no_details() {
        assert!(detail_lines(&change(Action::Delete, None)).is_empty());
    }

    #[test]
    fn test_secrets_are_masked() {
        let mut desired = State::new();
        desired.insert("wpa2_pre_shared_key".into(), Value::from("hunter22"));
        let lines = detail_lines(&change(Action::Create, Some(desired)));
        assert_eq!(lines, vec!["wpa2_pre_shared_key = (sensitive)"]);
    }
}
