//! Mock registry.
//!
//! One store per application, shared by `Arc`. The lock is only held for a
//! single scan-and-remove, never across an await, so two concurrent requests
//! can never both consume a one-shot mock.

use std::sync::{Mutex, MutexGuard};

use crate::mock::definition::MockDefinition;
use crate::mock::matcher::{matches, IncomingBody};

#[derive(Debug, Default)]
pub struct MockStore {
    mocks: Mutex<Vec<MockDefinition>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MockDefinition>> {
        self.mocks.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn register(&self, mock: MockDefinition) {
        tracing::debug!(
            method = %mock.method,
            url = %mock.url,
            persist = mock.persist,
            "Mock registered"
        );
        self.lock().push(mock);
    }

    /// Find the first mock answering the request. One-shot mocks are
    /// removed before the lock is released.
    pub fn take_match(&self, url: &str, method: &str, body: &IncomingBody) -> Option<MockDefinition> {
        let mut mocks = self.lock();
        let index = mocks
            .iter()
            .position(|mock| matches(mock, url, method, body))?;

        if mocks[index].persist {
            Some(mocks[index].clone())
        } else {
            Some(mocks.remove(index))
        }
    }

    pub fn snapshot(&self) -> Vec<MockDefinition> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
