// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lumenflow-coordinator: the WU lifecycle and concurrency coordinator.
//! Composes the storage layer's durable stores with lane locking, atomic
//! merges, spawn recovery and wave building into the public operations
//! from spec §4.H.

mod config;
mod error;
mod id_generator;
mod indexed_state;
mod lane_lock;
mod lifecycle;
mod merge_executor;
mod sink;
mod spawn_recovery;
mod wave_builder;

pub use config::{Config, Paths};
pub use error::CoordinatorError;
pub use id_generator::{next_wu_id, retry_on_push_collision};
pub use indexed_state::IndexedState;
pub use lane_lock::{AcquireResult, CheckResult, LaneLockManager, ReleaseResult, UnlockAudit};
pub use lifecycle::{AlreadyMergedCompletionResult, ClaimResult, Coordinator, DoneResult};
pub use merge_executor::{AtomicMergeExecutor, MergeContext};
pub use sink::{emit_lossy, FileSink, NoOpSink, Sink, SinkError, SinkTopic};
pub use spawn_recovery::{RecoveryAction, RecoveryOutcome, SpawnRecovery};
pub use wave_builder::WaveBuilder;

#[cfg(any(test, feature = "test-support"))]
pub use sink::{FakeSink, SinkCall};
