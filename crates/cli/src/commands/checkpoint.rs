// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use clap::Args;

use crate::context::Context;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct CheckpointArgs {
    /// Work unit id, e.g. WU-42
    id: String,
    #[arg(long)]
    note: String,
    #[arg(long)]
    session: Option<String>,
    #[arg(long)]
    progress: Option<String>,
    #[arg(long = "next-steps")]
    next_steps: Option<String>,
}

pub async fn run(ctx: &Context, args: CheckpointArgs) -> Result<()> {
    let wu_id = super::parse_wu_id(&args.id)?;
    ctx.coordinator()
        .checkpoint(&wu_id, args.note, args.session, args.progress, args.next_steps)
        .await
        .map_err(|e| ExitError::from_coordinator(&e))?;

    println!("checkpointed {wu_id}");
    Ok(())
}
