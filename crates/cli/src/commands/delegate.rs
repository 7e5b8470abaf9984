// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use clap::Args;
use lumenflow_core::DelegationId;

use crate::context::Context;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct DelegateArgs {
    /// Parent work unit id
    #[arg(long)]
    parent: String,
    /// Child work unit id
    #[arg(long)]
    child: String,
    /// Delegation id
    #[arg(long)]
    delegation_id: String,
}

pub async fn run(ctx: &Context, args: DelegateArgs) -> Result<()> {
    let parent_wu_id = super::parse_wu_id(&args.parent)?;
    let child_wu_id = super::parse_wu_id(&args.child)?;
    ctx.coordinator()
        .delegate(parent_wu_id, child_wu_id, DelegationId::new(args.delegation_id))
        .await
        .map_err(|e| ExitError::from_coordinator(&e))?;

    println!("delegation recorded");
    Ok(())
}
