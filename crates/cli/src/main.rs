// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! lumenflow - thin front end over the WU lifecycle coordinator.
//!
//! Argument parsing and human formatting are explicitly out of scope for
//! the core (spec §1); this binary exists so the workspace has a runnable
//! entry point and so integration tests can drive the coordinator the way
//! an operator would. It does not parse WU YAML/backlog documents itself —
//! `write_metadata` closures here are no-ops, left for the real front end
//! this crate stands in for.

mod commands;
mod context;
mod exit_error;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "lumenflow", version, about = "WU lifecycle and concurrency coordinator")]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long = "directory", global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a work unit
    Create(commands::create::CreateArgs),
    /// Claim a work unit's lane and move it to in_progress
    Claim(commands::claim::ClaimArgs),
    /// Mark a work unit blocked, releasing its lane
    Block(commands::block::BlockArgs),
    /// Move a blocked/waiting work unit back to in_progress
    Unblock(commands::unblock::UnblockArgs),
    /// Abandon a work unit without completing it
    Release(commands::release::ReleaseArgs),
    /// Record a progress checkpoint
    Checkpoint(commands::checkpoint::CheckpointArgs),
    /// Record a parent-to-child delegation
    Delegate(commands::delegate::DelegateArgs),
    /// Complete a work unit
    Done(commands::done::DoneArgs),
    /// Print the current state of all work units
    Status(commands::status::StatusArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        let code = e.downcast_ref::<ExitError>().map_or(1, |c| c.code);
        eprintln!("Error: {e}");
        std::process::exit(code);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let project_root = match cli.directory {
        Some(dir) => std::fs::canonicalize(&dir)?,
        None => std::env::current_dir()?,
    };
    let ctx = context::Context::new(&project_root);

    match cli.command {
        Commands::Create(args) => commands::create::run(&ctx, args).await,
        Commands::Claim(args) => commands::claim::run(&ctx, args).await,
        Commands::Block(args) => commands::block::run(&ctx, args).await,
        Commands::Unblock(args) => commands::unblock::run(&ctx, args).await,
        Commands::Release(args) => commands::release::run(&ctx, args).await,
        Commands::Checkpoint(args) => commands::checkpoint::run(&ctx, args).await,
        Commands::Delegate(args) => commands::delegate::run(&ctx, args).await,
        Commands::Done(args) => commands::done::run(&ctx, args).await,
        Commands::Status(args) => commands::status::run(&ctx, args).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
