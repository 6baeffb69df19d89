//! In-process message bus backed by a `tokio::sync::broadcast` channel.
//!
//! Without a Kafka producer, outbound messages are published here and a
//! subscribed [`EventLogger`](crate::logger::EventLogger) records them.

use tokio::sync::broadcast;

use crate::envelope::OutboundMessage;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out of [`OutboundMessage`]s.
pub struct EventBus {
    sender: broadcast::Sender<OutboundMessage>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest messages are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Returns how many received it.
    pub fn publish(&self, message: OutboundMessage) -> usize {
        // A SendError only means there are no receivers.
        self.sender.send(message).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
