//! Memoized help output.
//!
//! Help invocations are side-effect free and deterministic, so a cache can be
//! shared across sessions. Concurrent first misses recompute the same value.

use super::ExecutionOutcome;
use std::collections::HashMap;
use std::sync::RwLock;

/// Successful help outputs keyed by invocation.
#[derive(Debug, Default)]
pub struct HelpCache {
    entries: RwLock<HashMap<String, ExecutionOutcome>>,
}

impl HelpCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn get(&self, key: &str) -> Option<ExecutionOutcome> {
        self.entries.read().ok()?.get(key).cloned()
    }

    /// Store `outcome` if it succeeded. Failed help is never memoized.
    pub(super) fn insert(&self, key: String, outcome: &ExecutionOutcome) {
        if !outcome.succeeded {
            return;
        }
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, outcome.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
