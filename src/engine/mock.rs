use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{Engine, EngineExecution};
use crate::error::EngineError;
use crate::request::TransformationRequest;

/// A scripted engine for tests. Returns pre-defined outcomes in order.
pub struct MockEngine {
    outcomes: Mutex<VecDeque<Result<EngineExecution, EngineError>>>,
    calls: AtomicUsize,
}

impl MockEngine {
    pub fn new(outcomes: Vec<Result<EngineExecution, EngineError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `invoke` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Engine for MockEngine {
    async fn invoke(
        &self,
        _request: &TransformationRequest,
        _timeout: Duration,
    ) -> Result<EngineExecution, EngineError> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .outcomes
            .lock()
            .map_err(|_| EngineError::io("MockEngine", std::io::Error::other("poisoned")))?
            .pop_front();
        next.unwrap_or_else(|| {
            Err(EngineError::io(
                "MockEngine",
                std::io::Error::other(format!("no more outcomes (called {} times)", i + 1)),
            ))
        })
    }
}
