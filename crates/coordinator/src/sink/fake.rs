// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake sink for testing.

use super::{Sink, SinkError, SinkTopic};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// One recorded `emit` call.
#[derive(Debug, Clone)]
pub struct SinkCall {
    pub topic: SinkTopic,
    pub record: serde_json::Value,
}

#[derive(Default)]
struct FakeSinkState {
    calls: Vec<SinkCall>,
}

#[derive(Clone, Default)]
pub struct FakeSink {
    inner: Arc<Mutex<FakeSinkState>>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl Sink for FakeSink {
    async fn emit(&self, topic: SinkTopic, record: serde_json::Value) -> Result<(), SinkError> {
        self.inner.lock().calls.push(SinkCall { topic, record });
        Ok(())
    }
}
