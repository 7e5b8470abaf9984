// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod block;
pub mod checkpoint;
pub mod claim;
pub mod create;
pub mod delegate;
pub mod done;
pub mod release;
pub mod status;
pub mod unblock;

use lumenflow_core::WorkUnitId;

pub(crate) fn parse_wu_id(s: &str) -> anyhow::Result<WorkUnitId> {
    WorkUnitId::parse(s).map_err(|e| anyhow::anyhow!(e))
}
