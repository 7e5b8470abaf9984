// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads and atomically writes `artifacts/waves/<initiative>-wave-<n>.json`
//! manifests (spec §3, §4.J, §6).

use crate::error::StorageError;
use lumenflow_core::WaveManifest;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Manages the `artifacts/waves/` directory for one or more initiatives.
#[derive(Debug, Clone)]
pub struct WaveStore {
    dir: PathBuf,
}

impl WaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn manifest_path(&self, initiative: &str, wave: u64) -> PathBuf {
        self.dir.join(format!("{initiative}-wave-{wave}.json"))
    }

    /// Load every persisted manifest for `initiative`, sorted by wave number.
    pub fn load_all(&self, initiative: &str) -> Result<Vec<WaveManifest>, StorageError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let prefix = format!("{initiative}-wave-");
        let mut manifests = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !(name.starts_with(&prefix) && name.ends_with(".json")) {
                continue;
            }
            let file = File::open(entry.path())?;
            let reader = BufReader::new(file);
            let manifest: WaveManifest = serde_json::from_reader(reader)?;
            manifests.push(manifest);
        }

        manifests.sort_by_key(|m| m.wave);
        Ok(manifests)
    }

    /// The highest wave number persisted for `initiative`, if any.
    pub fn max_wave(&self, initiative: &str) -> Result<Option<u64>, StorageError> {
        Ok(self.load_all(initiative)?.into_iter().map(|m| m.wave).max())
    }

    /// Write `manifest` atomically (write-to-temp, then rename), matching
    /// the snapshot persistence discipline used elsewhere in this codebase.
    pub fn save(&self, manifest: &WaveManifest) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.manifest_path(&manifest.initiative, manifest.wave);
        let tmp_path = path.with_extension("tmp");

        {
            let file = File::create(&tmp_path)?;
            serde_json::to_writer_pretty(&file, manifest)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "wave_store_tests.rs"]
mod tests;
