//! Logs every message published on the [`EventBus`](crate::bus::EventBus).

use tokio::sync::broadcast;

use crate::envelope::OutboundMessage;

/// Background task writing bus traffic to the log.
pub struct EventLogger;

impl EventLogger {
    /// Run until the bus is dropped. Returns the number of messages seen.
    pub async fn run(mut receiver: broadcast::Receiver<OutboundMessage>) -> u64 {
        let mut seen = 0;
        loop {
            match receiver.recv().await {
                Ok(message) => {
                    seen += 1;
                    tracing::info!(
                        topic = %message.topic,
                        key = %message.key,
                        track_id = message.track_id().unwrap_or_default(),
                        bytes = message.payload.len(),
                        "event published"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "event logger lagged, some events were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(seen, "event bus closed, logger shutting down");
                    break;
                }
            }
        }
        seen
    }
}
