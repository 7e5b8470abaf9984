// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage-layer errors shared by the event log, spawn registry, and wave
//! manifest stores.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("lock contention on {path}: gave up after {attempts} attempts")]
    LockContention { path: String, attempts: u32 },
    #[error("corrupt entry at line {line}: {message}")]
    Corrupt { line: usize, message: String },
}
