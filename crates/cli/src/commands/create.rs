// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::{bail, Result};
use clap::Args;
use lumenflow_core::{CreatedMode, Lane, Priority, WorkUnitSpec};

use crate::context::Context;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct CreateArgs {
    /// Work unit id, e.g. WU-42
    pub(crate) id: String,
    /// Lane name, e.g. "Ops: Deploy"
    pub(crate) lane: String,
    /// Human-readable title
    pub(crate) title: String,
    /// P0, P1, P2, or P3
    #[arg(long, default_value = "P2")]
    pub(crate) priority: String,
    /// worktree, branch_only, or branch_pr
    #[arg(long, default_value = "worktree")]
    pub(crate) mode: String,
    #[arg(long)]
    pub(crate) initiative: Option<String>,
}

fn parse_priority(s: &str) -> Result<Priority> {
    Ok(match s.to_ascii_uppercase().as_str() {
        "P0" => Priority::P0,
        "P1" => Priority::P1,
        "P2" => Priority::P2,
        "P3" => Priority::P3,
        other => bail!("invalid priority {other:?}, expected one of P0/P1/P2/P3"),
    })
}

fn parse_mode(s: &str) -> Result<CreatedMode> {
    Ok(match s {
        "worktree" => CreatedMode::Worktree,
        "branch_only" => CreatedMode::BranchOnly,
        "branch_pr" => CreatedMode::BranchPr,
        other => bail!("invalid created_mode {other:?}, expected one of worktree/branch_only/branch_pr"),
    })
}

pub async fn run(ctx: &Context, args: CreateArgs) -> Result<()> {
    let spec = WorkUnitSpec {
        id: super::parse_wu_id(&args.id)?,
        lane: Lane::from(args.lane.as_str()),
        title: args.title,
        priority: parse_priority(&args.priority)?,
        created_mode: parse_mode(&args.mode)?,
        code_paths: Vec::new(),
        initiative: args.initiative,
    };

    let wu = ctx
        .coordinator()
        .create(spec)
        .await
        .map_err(|e| ExitError::from_coordinator(&e))?;

    println!("{}", serde_json::to_string_pretty(&wu)?);
    Ok(())
}
