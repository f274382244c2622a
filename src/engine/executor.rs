//! Terminal integration for the declarative executor

use anyhow::Result;
use colored::Colorize;
use declarative::{ApplyResult, ConfirmCallback, ExecuteReport, ExecuteSummary, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over the changes being applied
pub struct TerminalProgress {
    bar: Option<ProgressBar>,
    verbose: bool,
}

impl TerminalProgress {
    pub fn new(verbose: bool) -> Self {
        Self { bar: None, verbose }
    }

    fn println(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_batch_start(&mut self, count: usize) {
        println!();
        println!("  {} Applying {} change(s)...", "→".cyan(), count);

        let bar = ProgressBar::new(count as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        self.bar = Some(bar);
    }

    fn on_change_start(&mut self, target: &str, description: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(target.to_string());
        }
        if self.verbose {
            self.println(format!("    {} {}", "…".dimmed(), description));
        }
    }

    fn on_change_complete(&mut self, target: &str, result: &ApplyResult) {
        match result {
            ApplyResult::Failed { error } => {
                self.println(format!("    {} {} ({})", "✗".red(), target, error));
            }
            _ if self.verbose => {
                self.println(format!("    {} {}", result_symbol(result), target));
            }
            _ => {}
        }
        if let Some(bar) = &self.bar {
            bar.set_message(format!("{} {}", result_symbol(result), target));
            bar.inc(1);
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Symbol shown for an apply result
pub fn result_symbol(result: &ApplyResult) -> &'static str {
    match result {
        ApplyResult::NoChange => "○",
        ApplyResult::Created { .. }
        | ApplyResult::Modified { .. }
        | ApplyResult::Replaced { .. }
        | ApplyResult::Removed => "✓",
        ApplyResult::Failed { .. } => "✗",
        ApplyResult::Skipped { .. } => "⊘",
    }
}

/// Asks on the terminal unless `--yes` was given
pub struct DialoguerConfirm {
    yes: bool,
}

impl DialoguerConfirm {
    pub fn new(yes: bool) -> Self {
        Self { yes }
    }
}

impl ConfirmCallback for DialoguerConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.yes {
            return Ok(true);
        }

        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;

        Ok(confirmed)
    }
}

/// Print final summary
pub fn print_summary(report: &ExecuteReport) {
    let summary = &report.summary;
    println!();

    if summary.total_changes() == 0 && summary.failed == 0 {
        if summary.skipped > 0 {
            println!("  {} No changes made", "ℹ".blue());
        } else {
            println!("  {} Device already matches configuration", "✓".green());
        }
    } else if summary.is_success() {
        println!(
            "  {} Configuration applied successfully!",
            "✓".green().bold()
        );
    } else {
        println!(
            "  {} Configuration applied with errors",
            "⚠".yellow().bold()
        );
    }

    for line in summary_lines(summary) {
        println!("    • {line}");
    }

    for outcome in &report.outcomes {
        if let ApplyResult::Failed { error } = &outcome.result {
            println!("    {} {}: {}", "✗".red(), outcome.target(), error);
        }
    }
}

/// One line per non-zero counter
pub fn summary_lines(summary: &ExecuteSummary) -> Vec<String> {
    [
        (summary.created, "created"),
        (summary.modified, "modified"),
        (summary.replaced, "replaced"),
        (summary.removed, "removed"),
        (summary.skipped, "skipped"),
        (summary.failed, "failed"),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .map(|(count, verb)| format!("{count} resources {verb}"))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::State;

    #[test]
    fn test_result_symbol() {
        assert_eq!(result_symbol(&ApplyResult::NoChange), "○");
        assert_eq!(result_symbol(&ApplyResult::Removed), "✓");
        assert_eq!(
            result_symbol(&ApplyResult::Created {
                identity: "bond1".into(),
                state: State::new(),
            }),
            "✓"
        );
        assert_eq!(
            result_symbol(&ApplyResult::Skipped {
                reason: "Dry run".into()
            }),
            "⊘"
        );
    }

    #[test]
    fn test_summary_lines() {
        let summary = ExecuteSummary {
            created: 2,
            failed: 1,
            no_change: 5,
            ..Default::default()
        };
        assert_eq!(
            summary_lines(&summary),
            vec!["2 resources created", "1 resources failed"]
        );
    }

    #[test]
    fn test_confirm_with_yes() {
        let mut confirm = DialoguerConfirm::new(true);
        assert!(confirm.confirm("Apply 3 change(s)?").unwrap());
    }

    #[test]
    fn test_progress_without_terminal() {
        let mut progress = TerminalProgress::new(false);
        progress.on_batch_start(1);
        progress.on_change_start("interface_bonding.uplink", "create interface_bonding uplink");
        progress.on_change_complete("interface_bonding.uplink", &ApplyResult::Removed);
        progress.on_batch_complete();
        assert!(progress.bar.is_none());
    }
}
