// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-lane-fair wave selection with idempotent resumption (spec §4.J).

use lumenflow_core::{Clock, Lane, Status, WaveEntry, WaveManifest, WorkUnitId};
use lumenflow_storage::{StorageError, WaveStore};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::indexed_state::IndexedState;

pub struct WaveBuilder<C: Clock> {
    store: WaveStore,
    clock: C,
}

impl<C: Clock> WaveBuilder<C> {
    pub fn new(waves_dir: impl Into<std::path::PathBuf>, clock: C) -> Self {
        Self {
            store: WaveStore::new(waves_dir),
            clock,
        }
    }

    /// Build the next wave for `initiative` from `state`, excluding ids with
    /// a stamp file or already present in a prior manifest. Returns `None`
    /// if nothing is eligible. When `dry_run`, the manifest is returned but
    /// not persisted.
    pub fn build_wave(&self, initiative: &str, state: &IndexedState, stamps_dir: &Path, dry_run: bool) -> Result<Option<WaveManifest>, StorageError> {
        let prior = self.store.load_all(initiative)?;
        let next_wave = prior.iter().map(|m| m.wave).max().map(|w| w + 1).unwrap_or(0);

        let mut excluded: HashSet<WorkUnitId> = HashSet::new();
        if let Ok(entries) = std::fs::read_dir(stamps_dir) {
            for entry in entries.filter_map(|e| e.ok()) {
                if let Some(name) = entry.file_name().to_str().and_then(|n| n.strip_suffix(".done")) {
                    if let Ok(id) = WorkUnitId::parse(name) {
                        excluded.insert(id);
                    }
                }
            }
        }
        for manifest in &prior {
            for wu in &manifest.wus {
                excluded.insert(wu.id.clone());
            }
        }

        let ready = state.by_status(Status::Ready);
        let mut eligible_by_lane: HashMap<Lane, Vec<WorkUnitId>> = HashMap::new();
        for id in &ready {
            if excluded.contains(id) {
                continue;
            }
            let Some(wu) = state.wu(id) else { continue };
            if wu.initiative.as_deref() != Some(initiative) {
                continue;
            }
            eligible_by_lane.entry(wu.lane.clone()).or_default().push(id.clone());
        }

        let mut selected: Vec<(Lane, WorkUnitId)> = Vec::new();
        for (lane, mut ids) in eligible_by_lane {
            ids.sort_by_key(|id| id.number());
            if let Some(lowest) = ids.into_iter().next() {
                selected.push((lane, lowest));
            }
        }
        selected.sort_by_key(|(_, id)| id.number());

        if selected.is_empty() {
            return Ok(None);
        }

        let manifest = WaveManifest {
            initiative: initiative.to_string(),
            wave: next_wave,
            created_at: self.clock.now_rfc3339(),
            wus: selected
                .into_iter()
                .map(|(lane, id)| WaveEntry::spawned(id, lane))
                .collect(),
        };

        if !dry_run {
            self.store.save(&manifest)?;
        }

        Ok(Some(manifest))
    }
}

#[cfg(test)]
#[path = "wave_builder_tests.rs"]
mod tests;
