// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use clap::Args;

use crate::context::Context;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct BlockArgs {
    /// Work unit id, e.g. WU-42
    id: String,
    #[arg(long)]
    reason: String,
}

pub async fn run(ctx: &Context, args: BlockArgs) -> Result<()> {
    let wu_id = super::parse_wu_id(&args.id)?;
    ctx.coordinator()
        .block(&wu_id, args.reason)
        .await
        .map_err(|e| ExitError::from_coordinator(&e))?;

    println!("blocked {wu_id}");
    Ok(())
}
