//! In-process event bus for coordinator lifecycle events.
//!
//! Backed by a `tokio::sync::broadcast` channel so any number of observers
//! (progress output, tests) can follow a generation independently.

use genstudio_core::generation::Style;
use tokio::sync::broadcast;

use crate::model::GenerationResult;

/// Something that happened to the coordinator's logical operation.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    /// A new operation began (any previous one was superseded).
    Started { prompt: String, style: Style },
    /// An overloaded attempt failed and another will follow after the delay.
    Retrying { attempt: u32, max_retries: u32 },
    /// The overload condition persisted through every attempt.
    MaxRetriesReached { max_retries: u32 },
    /// The operation produced a result.
    Succeeded(GenerationResult),
    /// The operation was aborted or superseded.
    Aborted,
    /// The operation failed for a reason other than overload or cancellation.
    Failed { message: String },
}

const DEFAULT_CAPACITY: usize = 64;

/// Cheaply cloneable fan-out handle; clones publish on the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoordinatorEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped when nobody listens.
    pub fn publish(&self, event: CoordinatorEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
