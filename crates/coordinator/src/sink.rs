// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed, non-blocking event emission for audit/telemetry (spec §4.K).

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from sink operations. `Sink::emit` never propagates these to
/// callers; they exist so implementations have something to log.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("force-bypass record missing required field {0}")]
    MissingField(&'static str),
}

/// Which named sink a record is routed to, per spec §4.L's state layout.
#[derive(Debug, Clone)]
pub enum SinkTopic {
    /// `telemetry/<name>.ndjson`, appended.
    Telemetry(String),
    /// `recovery/<name>.json`, written once (spawn recovery audits carry
    /// their own timestamp in the filename, so collisions don't occur).
    Recovery(String),
    /// `force-bypasses.log`, appended as a pipe-delimited line.
    ForceBypass,
}

/// Sink for audit/telemetry records. Mirrors the notify-adapter shape used
/// elsewhere in this codebase: one method, cheap to clone, safe to share.
#[async_trait]
pub trait Sink: Clone + Send + Sync + 'static {
    async fn emit(&self, topic: SinkTopic, record: serde_json::Value) -> Result<(), SinkError>;
}

/// Writes records to files under the configured state root. All emit
/// failures are logged and swallowed by callers via [`emit_lossy`].
#[derive(Debug, Clone)]
pub struct FileSink {
    telemetry_dir: PathBuf,
    recovery_dir: PathBuf,
    force_bypass_log: PathBuf,
}

impl FileSink {
    pub fn new(telemetry_dir: impl Into<PathBuf>, recovery_dir: impl Into<PathBuf>, force_bypass_log: impl Into<PathBuf>) -> Self {
        Self {
            telemetry_dir: telemetry_dir.into(),
            recovery_dir: recovery_dir.into(),
            force_bypass_log: force_bypass_log.into(),
        }
    }

    fn write_force_bypass_line(path: &Path, record: &serde_json::Value) -> Result<(), SinkError> {
        let field = |name: &'static str| -> Result<String, SinkError> {
            record
                .get(name)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or(SinkError::MissingField(name))
        };
        let timestamp = field("timestamp")?;
        let hook = field("hook")?;
        let user = field("user")?;
        let branch = field("branch")?;
        let reason = field("reason")?;
        let cwd = field("cwd")?;
        let line = format!("{timestamp} | {hook} | {user} | {branch} | {reason} | {cwd}\n");

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SinkError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        use std::io::Write as _;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| SinkError::Io {
                path: path.display().to_string(),
                source,
            })?;
        file.write_all(line.as_bytes()).map_err(|source| SinkError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn append_ndjson(path: &Path, record: &serde_json::Value) -> Result<(), SinkError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SinkError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        use std::io::Write as _;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| SinkError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        file.write_all(&line).map_err(|source| SinkError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn write_json(path: &Path, record: &serde_json::Value) -> Result<(), SinkError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SinkError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        let bytes = serde_json::to_vec_pretty(record)?;
        std::fs::write(path, bytes).map_err(|source| SinkError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn emit(&self, topic: SinkTopic, record: serde_json::Value) -> Result<(), SinkError> {
        match topic {
            SinkTopic::Telemetry(name) => {
                Self::append_ndjson(&self.telemetry_dir.join(format!("{name}.ndjson")), &record)
            }
            SinkTopic::Recovery(name) => {
                Self::write_json(&self.recovery_dir.join(format!("{name}.json")), &record)
            }
            SinkTopic::ForceBypass => Self::write_force_bypass_line(&self.force_bypass_log, &record),
        }
    }
}

/// Discards every record. Used when telemetry is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl NoOpSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sink for NoOpSink {
    async fn emit(&self, _topic: SinkTopic, _record: serde_json::Value) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Emits a record and swallows any failure behind a one-line warning, per
/// spec §4.K ("non-fatal; all emit errors are swallowed with a one-line
/// warning").
pub async fn emit_lossy<S: Sink>(sink: &S, topic: SinkTopic, record: impl Serialize) {
    let value = match serde_json::to_value(record) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize sink record");
            return;
        }
    };
    if let Err(e) = sink.emit(topic, value).await {
        tracing::warn!(error = %e, "sink emit failed");
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSink, SinkCall};

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
