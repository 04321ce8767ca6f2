// Per-(user, video) state persistence.
// The host owns durable storage; the engine only needs load-before and save-after.

use std::collections::HashMap;

use crate::error::EngineError;
use crate::types::*;

/// Persistence collaborator for engagement state.
pub trait EngagementStore {
    /// `Ok(None)` means this pair has never reported.
    fn load(&self, key: &EngagementKey) -> Result<Option<EngagementState>, EngineError>;

    fn save(&mut self, key: &EngagementKey, state: EngagementState) -> Result<(), EngineError>;
}

/// In-memory store. Backs the WASM engine, where the page's lifetime is the session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    states: HashMap<EngagementKey, EngagementState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl EngagementStore for MemoryStore {
    fn load(&self, key: &EngagementKey) -> Result<Option<EngagementState>, EngineError> {
        Ok(self.states.get(key).copied())
    }

    fn save(&mut self, key: &EngagementKey, state: EngagementState) -> Result<(), EngineError> {
        self.states.insert(key.clone(), state);
        Ok(())
    }
}
