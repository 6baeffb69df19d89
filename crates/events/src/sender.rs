//! Destinations for outbound messages.

use std::sync::Arc;

use async_trait::async_trait;

use crate::bus::EventBus;
use crate::envelope::OutboundMessage;
use crate::PublishError;

#[async_trait]
pub trait EventSender: Send + Sync {
    /// Deliver `messages` in order. Stops at the first failure.
    async fn send(&self, messages: Vec<OutboundMessage>) -> Result<(), PublishError>;
}

/// Publishes onto the in-process [`EventBus`].
#[derive(Clone)]
pub struct BusSender {
    bus: Arc<EventBus>,
}

impl BusSender {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl EventSender for BusSender {
    async fn send(&self, messages: Vec<OutboundMessage>) -> Result<(), PublishError> {
        for message in messages {
            self.bus.publish(message);
        }
        Ok(())
    }
}
