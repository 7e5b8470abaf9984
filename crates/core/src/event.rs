// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The append-only WU event log's record type (spec §3, §6).

use crate::ids::{DelegationId, EventId};
use crate::lane::Lane;
use crate::work_unit::{CreatedMode, Priority};
use crate::ids::WorkUnitId;
use serde::{Deserialize, Serialize};

/// One line of the event log: common envelope fields plus a type-tagged
/// payload, flattened together so the wire shape is a single flat JSON
/// object per spec §6 (`event_id`, `timestamp`, `wu_id`, `type`, then
/// type-specific fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WUEvent {
    pub event_id: EventId,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
    pub wu_id: WorkUnitId,
    #[serde(flatten)]
    pub payload: EventPayload,
}

/// Type-specific event payloads. Serializes as `{"type": "create", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    Create {
        lane: Lane,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        priority: Option<Priority>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        created_mode: Option<CreatedMode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initiative: Option<String>,
    },
    Claim {
        lane: Lane,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent_session: Option<String>,
    },
    Checkpoint {
        note: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        progress: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next_steps: Option<String>,
    },
    Block {
        reason: String,
    },
    Unblock {},
    Complete {
        completed_at: String,
    },
    Release {
        reason: String,
    },
    Delegate {
        parent_wu_id: WorkUnitId,
        child_wu_id: WorkUnitId,
        delegation_id: DelegationId,
    },
    /// Sentinel "delegation cutover" event, written once per log to migrate
    /// legacy schemas that predate the `delegate` event type.
    DelegationCutover {},
}

impl WUEvent {
    /// The [`crate::status::Status`] this event, if legal, transitions the
    /// WU *to*. Returns `None` for events that don't change status
    /// (`checkpoint`, `delegate`, `delegation_cutover`).
    pub fn target_status(&self) -> Option<crate::status::Status> {
        use crate::status::Status;
        match &self.payload {
            EventPayload::Create { .. } => Some(Status::Ready),
            EventPayload::Claim { .. } => Some(Status::InProgress),
            EventPayload::Block { .. } => Some(Status::Blocked),
            EventPayload::Unblock {} => Some(Status::InProgress),
            EventPayload::Complete { .. } => Some(Status::Done),
            EventPayload::Release { .. } => Some(Status::Ready),
            EventPayload::Checkpoint { .. }
            | EventPayload::Delegate { .. }
            | EventPayload::DelegationCutover {} => None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
