// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The lane lock file's on-disk shape (spec §6).

use crate::ids::WorkUnitId;
use serde::{Deserialize, Serialize};

/// Content of `locks/<kebab(lane)>.lock`.
///
/// Serialized as pretty-printed JSON with 2-space indent; field order here
/// matches the documented wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    pub wu_id: WorkUnitId,
    pub lane: String,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
    pub pid: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_session: Option<String>,
}

#[cfg(test)]
#[path = "lock_entry_tests.rs"]
mod tests;
