mod cli;
mod commands;
mod config;
mod engine;
mod paths;
mod resource;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use commands::declarative::ApplyOptions;
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// `--config`, when given
    pub config_path: Option<PathBuf>,
    /// `--state`, when given
    pub state_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config_path: cli.config,
        state_path: cli.state,
    };

    match cli.command {
        Command::Plan(args) => commands::declarative::plan(&ctx, args.target.as_deref(), args.jobs),
        Command::Apply(args) => commands::declarative::apply(
            &ctx,
            &ApplyOptions {
                target: args.target.as_deref(),
                dry_run: args.dry_run,
                yes: args.yes,
                jobs: args.jobs.max(1),
            },
        ),
        Command::Import(args) => {
            commands::crud::import(&ctx, &args.kind, &args.identity, args.key.as_deref())
        }
        Command::Show(args) => commands::crud::show(&ctx, &args.kind, &args.identity),
        Command::Destroy(args) => {
            commands::crud::destroy(&ctx, &args.kind, &args.identity, args.yes)
        }
        Command::Kinds { kind } => commands::kinds::run(kind.as_deref()),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "roscfg", &mut io::stdout());
            Ok(())
        }
    }
}
