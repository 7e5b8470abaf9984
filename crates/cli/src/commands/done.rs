// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::context::Context;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct DoneArgs {
    /// Work unit id, e.g. WU-42
    id: String,
    #[arg(long = "lane-branch")]
    lane_branch: String,
    #[arg(long, default_value = "origin")]
    remote: String,
}

/// This binary does not own WU YAML/backlog emission (spec §1); a real
/// front end would supply a `write_metadata` closure that stamps those
/// documents. Here it's a no-op so the coordinator's merge/push sequencing
/// can still be exercised end to end.
pub async fn run(ctx: &Context, args: DoneArgs) -> Result<()> {
    let wu_id = super::parse_wu_id(&args.id)?;
    let touched_paths: Vec<PathBuf> = Vec::new();

    let result = ctx
        .coordinator()
        .done(
            &ctx.vcs,
            &wu_id,
            &ctx.project_root,
            &args.lane_branch,
            &args.remote,
            &touched_paths,
            |_work_dir| async { Ok(()) },
        )
        .await
        .map_err(|e| ExitError::from_coordinator(&e))?;

    println!(
        "done {wu_id}: merged={} pushed={} pr_url={:?}",
        result.merged, result.pushed, result.pr_url
    );
    Ok(())
}
