// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use clap::Args;
use lumenflow_core::Status;

use crate::context::Context;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct StatusArgs {}

pub async fn run(ctx: &Context, _args: StatusArgs) -> Result<()> {
    let state = ctx
        .coordinator()
        .load_state()
        .map_err(|e| ExitError::from_coordinator(&e))?;

    for status in Status::ALL {
        let ids = state.by_status(status);
        println!("{status}: {}", ids.len());
        let mut sorted: Vec<_> = ids.into_iter().collect();
        sorted.sort();
        for id in sorted {
            if let Some(wu) = state.wu(&id) {
                println!("  {} [{}] {}", wu.id, wu.lane, wu.title);
            }
        }
    }
    Ok(())
}
