// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory projection of the event log (spec §4.D).

use lumenflow_core::{EventPayload, Lane, Status, WUEvent, WorkUnit, WorkUnitId};
use std::collections::{HashMap, HashSet};

/// Pure replay projection: `by_id`, `by_status`, `by_lane`,
/// `children_of(parent_id)`. Rebuilt fully on `from_events`, updated
/// incrementally by `apply_event`. Lookups are expected-O(1) hash map reads.
#[derive(Debug, Clone, Default)]
pub struct IndexedState {
    by_id: HashMap<WorkUnitId, WorkUnit>,
    by_status: HashMap<Status, HashSet<WorkUnitId>>,
    by_lane: HashMap<Lane, HashSet<WorkUnitId>>,
    children_of: HashMap<WorkUnitId, HashSet<WorkUnitId>>,
    parent_of: HashMap<WorkUnitId, WorkUnitId>,
}

impl IndexedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: &[WUEvent]) -> Self {
        let mut state = Self::new();
        for event in events {
            state.apply_event(event);
        }
        state
    }

    pub fn wu(&self, id: &WorkUnitId) -> Option<&WorkUnit> {
        self.by_id.get(id)
    }

    pub fn by_status(&self, status: Status) -> HashSet<WorkUnitId> {
        self.by_status.get(&status).cloned().unwrap_or_default()
    }

    pub fn by_lane(&self, lane: &Lane) -> HashSet<WorkUnitId> {
        self.by_lane.get(lane).cloned().unwrap_or_default()
    }

    pub fn children_of(&self, parent_id: &WorkUnitId) -> HashSet<WorkUnitId> {
        self.children_of.get(parent_id).cloned().unwrap_or_default()
    }

    pub fn parent_of(&self, child_id: &WorkUnitId) -> Option<&WorkUnitId> {
        self.parent_of.get(child_id)
    }

    pub fn all_ids(&self) -> impl Iterator<Item = &WorkUnitId> {
        self.by_id.keys()
    }

    fn move_status(&mut self, id: &WorkUnitId, new_status: Status) {
        if let Some(wu) = self.by_id.get_mut(id) {
            self.by_status.entry(wu.status).or_default().remove(id);
            wu.status = new_status;
        }
        self.by_status.entry(new_status).or_default().insert(id.clone());
    }

    /// Pure projection step used during replay and by the lifecycle
    /// coordinator's `append_and_apply`.
    pub fn apply_event(&mut self, event: &WUEvent) {
        let id = event.wu_id.clone();
        if let EventPayload::Create {
            lane,
            title,
            priority,
            created_mode,
            initiative,
        } = &event.payload
        {
            let wu = WorkUnit {
                id: id.clone(),
                lane: lane.clone(),
                title: title.clone(),
                status: Status::Ready,
                priority: priority.unwrap_or(lumenflow_core::Priority::P2),
                created_mode: created_mode.unwrap_or(lumenflow_core::CreatedMode::Worktree),
                code_paths: Vec::new(),
                initiative: initiative.clone(),
                blocked_by: Vec::new(),
                blocks: Vec::new(),
                dependencies: Vec::new(),
            };
            self.by_lane.entry(lane.clone()).or_default().insert(id.clone());
            self.by_id.insert(id.clone(), wu);
            self.by_status.entry(Status::Ready).or_default().insert(id.clone());
        }

        if let Some(target) = event.target_status() {
            if !matches!(event.payload, EventPayload::Create { .. }) {
                self.move_status(&id, target);
            }
        }

        if let EventPayload::Delegate {
            parent_wu_id,
            child_wu_id,
            ..
        } = &event.payload
        {
            self.children_of
                .entry(parent_wu_id.clone())
                .or_default()
                .insert(child_wu_id.clone());
            self.parent_of.insert(child_wu_id.clone(), parent_wu_id.clone());
        }
    }
}

#[cfg(test)]
#[path = "indexed_state_tests.rs"]
mod tests;
