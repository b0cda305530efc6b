//! Event Bus adapter
//!
//! Implements the EventBus port by recording published events

use crate::events::ConsensusEvent;
use crate::ports::EventBus;
use async_trait::async_trait;

/// In-memory event bus adapter for testing
pub struct InMemoryEventBus {
    events: parking_lot::RwLock<Vec<ConsensusEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            events: parking_lot::RwLock::new(Vec::new()),
        }
    }

    pub fn get_events(&self) -> Vec<ConsensusEvent> {
        self.events.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: ConsensusEvent) -> Result<(), String> {
        self.events.write().push(event);
        Ok(())
    }
}
