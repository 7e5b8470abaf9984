// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detect and clean up dead sub-agents (spec §4.I).

use lumenflow_core::{Clock, ProcessProbe, SpawnId, SpawnRecord, SpawnStatus, WorkUnitId};
use lumenflow_storage::{SpawnStore, StorageError};
use serde::Serialize;
use std::time::Duration;

use crate::lane_lock::LaneLockManager;
use crate::sink::{emit_lossy, Sink, SinkTopic};

/// The outcome of a single [`SpawnRecovery::recover`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    None,
    ReleasedZombie,
    ReleasedStale,
    EscalatedStuck,
}

impl RecoveryAction {
    fn as_str(self) -> &'static str {
        match self {
            RecoveryAction::None => "none",
            RecoveryAction::ReleasedZombie => "released_zombie",
            RecoveryAction::ReleasedStale => "released_stale",
            RecoveryAction::EscalatedStuck => "escalated_stuck",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecoveryOutcome {
    pub recovered: bool,
    pub action: RecoveryAction,
    pub reason: String,
}

#[derive(Serialize)]
struct RecoveryAuditRecord {
    timestamp: String,
    #[serde(rename = "spawnId")]
    spawn_id: String,
    action: &'static str,
    reason: String,
    context: RecoveryAuditContext,
}

#[derive(Serialize)]
struct RecoveryAuditContext {
    #[serde(rename = "targetWuId")]
    target_wu_id: String,
    lane: String,
    #[serde(rename = "lockMetadata", skip_serializing_if = "Option::is_none")]
    lock_metadata: Option<lumenflow_core::LockEntry>,
}

pub struct SpawnRecovery<C: Clock, P: ProcessProbe> {
    store: SpawnStore<C, P>,
    clock: C,
}

impl<C: Clock, P: ProcessProbe> SpawnRecovery<C, P> {
    pub fn new(store: SpawnStore<C, P>, clock: C) -> Self {
        Self { store, clock }
    }

    /// Run the priority-ordered recovery checks from spec §4.I against the
    /// named spawn, consulting the lane lock and the most recent checkpoint
    /// for `target_wu` (via `last_checkpoint_at`, an epoch-ms timestamp the
    /// caller derives from the event log).
    pub async fn recover<S: Sink>(
        &self,
        spawn_id: &SpawnId,
        lane_locks: &LaneLockManager<C, P>,
        probe: &P,
        last_checkpoint_at: Option<u64>,
        no_checkpoint_threshold: Duration,
        sink: &S,
    ) -> Result<RecoveryOutcome, StorageError> {
        let records = self.store.load()?;
        let Some(record) = records.iter().find(|r| r.spawn_id == *spawn_id) else {
            return Ok(RecoveryOutcome {
                recovered: false,
                action: RecoveryAction::None,
                reason: "no such spawn record".to_string(),
            });
        };

        if record.status.is_terminal() {
            return Ok(RecoveryOutcome {
                recovered: false,
                action: RecoveryAction::None,
                reason: "already completed".to_string(),
            });
        }

        let lane_kebab = record.lane.kebab();
        let check = lane_locks.check(&lane_kebab).map_err(|e| StorageError::Corrupt {
            line: 0,
            message: e.to_string(),
        })?;

        let Some(lock) = check.metadata else {
            return Ok(RecoveryOutcome {
                recovered: false,
                action: RecoveryAction::None,
                reason: "no lock file".to_string(),
            });
        };

        if !probe.is_alive(lock.pid) {
            self.finish(&lane_kebab, lane_locks, spawn_id, &record.target_wu, record.lane.as_str(), RecoveryAction::ReleasedZombie, "lock owner's pid is dead", Some(lock), sink).await?;
            return Ok(RecoveryOutcome {
                recovered: true,
                action: RecoveryAction::ReleasedZombie,
                reason: "lock owner's pid is dead".to_string(),
            });
        }

        if check.is_stale {
            self.finish(&lane_kebab, lane_locks, spawn_id, &record.target_wu, record.lane.as_str(), RecoveryAction::ReleasedStale, "lock exceeded stale threshold", Some(lock), sink).await?;
            return Ok(RecoveryOutcome {
                recovered: true,
                action: RecoveryAction::ReleasedStale,
                reason: "lock exceeded stale threshold".to_string(),
            });
        }

        let checkpoint_age_ms = last_checkpoint_at.map(|ts| self.clock.epoch_ms().saturating_sub(ts));
        let stuck = match checkpoint_age_ms {
            None => true,
            Some(age) => age > no_checkpoint_threshold.as_millis() as u64,
        };

        if stuck {
            let audit = RecoveryAuditRecord {
                timestamp: self.clock.now_rfc3339(),
                spawn_id: spawn_id.as_str().to_string(),
                action: RecoveryAction::EscalatedStuck.as_str(),
                reason: "no recent checkpoint".to_string(),
                context: RecoveryAuditContext {
                    target_wu_id: record.target_wu.to_string(),
                    lane: record.lane.to_string(),
                    lock_metadata: Some(lock),
                },
            };
            emit_lossy(
                sink,
                SinkTopic::Recovery(format!("spawn-{}-{}", spawn_id.as_str(), self.clock.epoch_ms())),
                &audit,
            )
            .await;
            self.store.append(&SpawnRecord {
                status: SpawnStatus::Stuck,
                completed_at: None,
                ..record.clone()
            })?;
            return Ok(RecoveryOutcome {
                recovered: false,
                action: RecoveryAction::EscalatedStuck,
                reason: "no recent checkpoint".to_string(),
            });
        }

        Ok(RecoveryOutcome {
            recovered: false,
            action: RecoveryAction::None,
            reason: "healthy".to_string(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn finish<S: Sink>(
        &self,
        lane_kebab: &str,
        lane_locks: &LaneLockManager<C, P>,
        spawn_id: &SpawnId,
        target_wu: &WorkUnitId,
        lane: &str,
        action: RecoveryAction,
        reason: &str,
        lock_metadata: Option<lumenflow_core::LockEntry>,
        sink: &S,
    ) -> Result<(), StorageError> {
        let _ = lane_locks.release(lane_kebab, None, true);

        let new_status = if action == RecoveryAction::ReleasedZombie {
            SpawnStatus::Crashed
        } else {
            SpawnStatus::Timeout
        };

        if let Some(existing) = self.store.load()?.into_iter().find(|r| r.spawn_id == *spawn_id) {
            self.store.append(&SpawnRecord {
                status: new_status,
                completed_at: Some(self.clock.now_rfc3339()),
                ..existing
            })?;
        }

        let audit = RecoveryAuditRecord {
            timestamp: self.clock.now_rfc3339(),
            spawn_id: spawn_id.as_str().to_string(),
            action: action.as_str(),
            reason: reason.to_string(),
            context: RecoveryAuditContext {
                target_wu_id: target_wu.to_string(),
                lane: lane.to_string(),
                lock_metadata,
            },
        };
        emit_lossy(
            sink,
            SinkTopic::Recovery(format!("spawn-{}-{}", spawn_id.as_str(), self.clock.epoch_ms())),
            &audit,
        )
        .await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "spawn_recovery_tests.rs"]
mod tests;
