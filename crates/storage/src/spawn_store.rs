// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL registry of [`SpawnRecord`]s (spec §4.I), sharing the
//! event log's exclusive-create append-locking discipline.

use crate::error::StorageError;
use crate::pid_lock;
use lumenflow_core::{Clock, ProcessProbe, SpawnRecord};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(2 * 3600);
const DEFAULT_MAX_LOCK_ATTEMPTS: u32 = 20;
const DEFAULT_LOCK_BACKOFF: Duration = Duration::from_millis(20);

/// JSONL store of spawn/delegation records, one line per recorded state
/// transition (a target spawn's status changes by appending a fresh record
/// with the same `spawn_id`; the registry's in-memory projection keeps the
/// latest one).
#[derive(Debug, Clone)]
pub struct SpawnStore<C: Clock, P: ProcessProbe> {
    path: PathBuf,
    lock_path: PathBuf,
    clock: C,
    probe: P,
    stale_after: Duration,
}

impl<C: Clock, P: ProcessProbe> SpawnStore<C, P> {
    pub fn new(path: impl Into<PathBuf>, clock: C, probe: P) -> Self {
        let path = path.into();
        let mut lock_os = path.as_os_str().to_owned();
        lock_os.push(".lock");
        Self {
            lock_path: PathBuf::from(lock_os),
            path,
            clock,
            probe,
            stale_after: DEFAULT_STALE_AFTER,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a spawn record. Later records with the same `spawn_id`
    /// supersede earlier ones when the registry is loaded.
    pub fn append(&self, record: &SpawnRecord) -> Result<(), StorageError> {
        let _guard = pid_lock::acquire(
            &self.lock_path,
            &self.clock,
            &self.probe,
            self.stale_after,
            DEFAULT_MAX_LOCK_ATTEMPTS,
            DEFAULT_LOCK_BACKOFF,
        )?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        file.write_all(&line)?;
        Ok(())
    }

    /// Load the latest record per `spawn_id`, in first-seen order.
    pub fn load(&self) -> Result<Vec<SpawnRecord>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut order: Vec<String> = Vec::new();
        let mut latest: std::collections::HashMap<String, SpawnRecord> =
            std::collections::HashMap::new();

        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Ok(record) = serde_json::from_str::<SpawnRecord>(trimmed) else {
                continue;
            };
            let key = record.spawn_id.as_str().to_string();
            if !latest.contains_key(&key) {
                order.push(key.clone());
            }
            latest.insert(key, record);
        }

        Ok(order.into_iter().filter_map(|k| latest.remove(&k)).collect())
    }
}

#[cfg(test)]
#[path = "spawn_store_tests.rs"]
mod tests;
