// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use clap::Args;

use crate::context::Context;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct ClaimArgs {
    /// Work unit id, e.g. WU-42
    pub(crate) id: String,
    #[arg(long)]
    pub(crate) session: Option<String>,
}

pub async fn run(ctx: &Context, args: ClaimArgs) -> Result<()> {
    let wu_id = super::parse_wu_id(&args.id)?;
    let result = ctx
        .coordinator()
        .claim(&wu_id, args.session)
        .await
        .map_err(|e| ExitError::from_coordinator(&e))?;

    println!("claimed {} on branch {}", result.wu_id, result.branch_name);
    Ok(())
}
