//! Change events for migrated documents.
//!
//! - [`api`]: the JSON wire shapes consumers of the operate topics expect.
//! - [`envelope`]: topics, `Create` envelopes, and outbound messages.
//! - [`EventBus`]: in-process fan-out of outbound messages.
//! - [`EventSender`]: where messages go, either the bus or Kafka (with the
//!   `kafka` feature).
//! - [`publish_batch`]: encode and send one batch, logging failures.

pub mod api;
pub mod bus;
pub mod config;
pub mod envelope;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod logger;
pub mod publisher;
pub mod sender;

pub use bus::EventBus;
pub use config::KafkaConfig;
pub use envelope::{Entity, OutboundMessage, Publishable};
pub use logger::EventLogger;
pub use publisher::publish_batch;
pub use sender::{BusSender, EventSender};

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("producer: {0}")]
    Producer(String),

    #[error("invalid config: {0}")]
    Config(String),
}
